//! Built-in loan applicant schema
//!
//! Fields, defaults and column order of the loan approval model. Reference
//! categories are the lexically first category of each field at training
//! time, which is the one drop-first one-hot encoding leaves out.

use crate::schema::{FeatureSchema, FieldSpec};

/// Column order the loan model was trained on
pub const LOAN_COLUMNS: [&str; 14] = [
    "ApplicantIncome",
    "CoapplicantIncome",
    "LoanAmount",
    "Loan_Amount_Term",
    "Credit_History",
    "Gender_Male",
    "Married_Yes",
    "Dependents_1",
    "Dependents_2",
    "Dependents_3+",
    "Education_Not Graduate",
    "Self_Employed_Yes",
    "Property_Area_Semiurban",
    "Property_Area_Urban",
];

/// The loan applicant schema
pub fn loan_schema() -> FeatureSchema {
    let fields = vec![
        FieldSpec::numeric("ApplicantIncome", 5000.0).with_alias("Income"),
        FieldSpec::numeric("CoapplicantIncome", 0.0),
        FieldSpec::numeric("LoanAmount", 146.4),
        FieldSpec::numeric("Loan_Amount_Term", 360.0),
        FieldSpec::numeric("Credit_History", 1.0),
        FieldSpec::categorical("Gender", "Male", "Female"),
        FieldSpec::categorical("Married", "Yes", "No"),
        FieldSpec::categorical("Dependents", "0", "0"),
        FieldSpec::categorical("Education", "Graduate", "Graduate"),
        FieldSpec::categorical("Self_Employed", "No", "No"),
        FieldSpec::categorical("Property_Area", "Semiurban", "Rural")
            .with_value_alias("0", "Rural")
            .with_value_alias("1", "Urban")
            .with_value_alias("2", "Semiurban"),
    ];

    FeatureSchema::new(fields, LOAN_COLUMNS.iter().map(|c| c.to_string()).collect())
}
