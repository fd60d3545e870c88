use crate::service::{AppState, MODEL_MISSING_MESSAGE};
use actix_cors::Cors;
use actix_web::{http::header::ContentType, web, App, HttpResponse, HttpServer, Result as ActixResult};
use loanx_schema::{FeatureSchema, FieldValue, PredictionResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info_span;
use uuid::Uuid;

pub struct RestApi;

impl RestApi {
    pub async fn start(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(Self::configure)
        })
        .bind((host, port))?
        .run()
        .await
    }

    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/", web::get().to(home))
            .route("/predict", web::post().to(predict_form))
            .route("/api/predict", web::post().to(predict_json))
            .route("/api/schema", web::get().to(get_schema))
            .route("/healthz", web::get().to(health));
    }
}

async fn home(state: web::Data<Arc<AppState>>) -> ActixResult<HttpResponse> {
    Ok(html(render_page(&state.schema, None)))
}

async fn predict_form(
    state: web::Data<Arc<AppState>>,
    form: web::Form<HashMap<String, String>>,
) -> ActixResult<HttpResponse> {
    let message = match &state.predictor {
        None => MODEL_MISSING_MESSAGE.to_string(),
        Some(predictor) => {
            let span = info_span!("predict", request_id = %Uuid::new_v4(), route = "form");
            let _guard = span.enter();
            match predictor.predict(&form.into_inner()) {
                Ok(prediction) => prediction.decision().message().to_string(),
                Err(e) => e.user_message(),
            }
        }
    };

    Ok(html(render_page(&state.schema, Some(&message))))
}

async fn predict_json(
    state: web::Data<Arc<AppState>>,
    req: web::Json<serde_json::Map<String, Value>>,
) -> ActixResult<HttpResponse> {
    let predictor = match &state.predictor {
        Some(p) => p,
        None => {
            return Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": MODEL_MISSING_MESSAGE
            })));
        }
    };

    let raw = json_to_raw(req.into_inner());

    let span = info_span!("predict", request_id = %Uuid::new_v4(), route = "json");
    let _guard = span.enter();

    match predictor.predict(&raw) {
        Ok(prediction) => {
            let response =
                PredictionResponse::new(prediction.label, prediction.explained, prediction.warnings);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => Ok(HttpResponse::InternalServerError().json(serde_json::json!({
            "error": e.user_message()
        }))),
    }
}

async fn get_schema(state: web::Data<Arc<AppState>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.schema.as_ref()))
}

async fn health(state: web::Data<Arc<AppState>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "model_loaded": state.model_loaded(),
    })))
}

/// Flatten a JSON object into raw strings; nulls count as missing
fn json_to_raw(object: serde_json::Map<String, Value>) -> HashMap<String, String> {
    object
        .into_iter()
        .filter_map(|(key, value)| {
            let raw = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, raw))
        })
        .collect()
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

fn render_page(schema: &FeatureSchema, prediction: Option<&str>) -> String {
    let mut inputs = String::new();
    for field in &schema.fields {
        let placeholder = match &field.default {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Category(c) => c.clone(),
        };
        inputs.push_str(&format!(
            "    <label>{name} <input name=\"{name}\" placeholder=\"{placeholder}\"></label><br>\n",
            name = escape(&field.name),
            placeholder = escape(&placeholder),
        ));
    }

    let result = prediction
        .map(|p| format!("  <p class=\"prediction\">{}</p>\n", escape(p)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Loan Approval Prediction</title></head>\n<body>\n  <h1>Loan Approval Prediction</h1>\n  <form action=\"/predict\" method=\"post\">\n{}    <button type=\"submit\">Predict</button>\n  </form>\n{}</body>\n</html>\n",
        inputs, result
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test};
    use loanx_core::{Classifier, FeatureVector, Label, Result as CoreResult};
    use loanx_schema::loan_schema;

    /// Approves urban applicants
    struct UrbanOnly;

    impl Classifier for UrbanOnly {
        fn predict(&self, features: &FeatureVector) -> CoreResult<Label> {
            match features.get(13) {
                Some(v) if v == 1.0 => Ok(Label::Positive),
                _ => Ok(Label::Negative),
            }
        }
    }

    fn state(with_model: bool) -> Arc<AppState> {
        let classifier: Option<Arc<dyn Classifier>> = if with_model {
            Some(Arc::new(UrbanOnly))
        } else {
            None
        };
        Arc::new(AppState::new(Arc::new(loan_schema()), classifier))
    }

    #[actix_web::test]
    async fn test_json_predict() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(true)))
                .configure(RestApi::configure),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/predict")
            .set_json(serde_json::json!({
                "Credit_History": "1",
                "Property_Area": "1",
                "Income": 5400,
                "LoanAmount": "abc",
                "Gender": null
            }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["prediction"], "✅ Loan Approved!");
        assert_eq!(body["label"], 1);
        assert_eq!(body["features"].as_array().unwrap().len(), 14);
        assert_eq!(body["features"][0]["column"], "ApplicantIncome");
        assert_eq!(body["features"][0]["value"], 5400.0);
        assert_eq!(body["features"][5]["column"], "Gender_Male");
        assert_eq!(body["features"][5]["value"], 1.0);
        assert_eq!(body["warnings"][0]["field"], "LoanAmount");
    }

    #[actix_web::test]
    async fn test_form_predict_renders_message() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(true)))
                .configure(RestApi::configure),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/predict")
            .set_form(vec![("Property_Area", "Rural"), ("ApplicantIncome", "")])
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = actix_test::read_body(resp).await;
        let page = std::str::from_utf8(&body).unwrap();
        assert!(page.contains("❌ Loan Rejected."));
    }

    #[actix_web::test]
    async fn test_missing_model() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(false)))
                .configure(RestApi::configure),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/predict")
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let req = actix_test::TestRequest::post()
            .uri("/predict")
            .set_form(vec![("Gender", "Male")])
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert!(std::str::from_utf8(&body).unwrap().contains(MODEL_MISSING_MESSAGE));

        let req = actix_test::TestRequest::get().uri("/healthz").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["model_loaded"], false);
    }

    #[actix_web::test]
    async fn test_home_and_schema() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state(true)))
                .configure(RestApi::configure),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/").to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        let page = std::str::from_utf8(&body).unwrap();
        assert!(page.contains("name=\"Property_Area\""));
        assert!(!page.contains("class=\"prediction\""));

        let req = actix_test::TestRequest::get().uri("/api/schema").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["columns"].as_array().unwrap().len(), 14);
    }

    #[test]
    fn test_json_to_raw() {
        let object = serde_json::json!({"a": 1.5, "b": "x", "c": null, "d": true});
        let raw = json_to_raw(object.as_object().unwrap().clone());
        assert_eq!(raw.get("a").map(String::as_str), Some("1.5"));
        assert_eq!(raw.get("b").map(String::as_str), Some("x"));
        assert!(!raw.contains_key("c"));
        assert_eq!(raw.get("d").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
