use axum::{
    body::Bytes,
    extract::{Json, State},
    routing::{post, Router},
};
use log::info;
use serde_json::{json, Number, Value};
use tower_http::cors::CorsLayer;

mod error;
mod payment_gateway;

use error::PaymentError;
use payment_gateway::merchant_portal::Merchant;
use payment_gateway::mpesa_payment_gateway::MpesaPaymentProcessor;

#[derive(Clone)]
struct AppState {
    merchant: Merchant,
    http: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct PaymentDetails {
    phone: Option<String>,
    amount: Option<Number>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let merchant = Merchant::from_env();
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("failed to build http client");

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");

    let app = app(AppState { merchant, http });

    info!("Server running on port {port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Invalid address");
    axum::serve(listener, app).await.unwrap();
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/stk-push", post(process_payment))
        .route("/callback", post(call_back_url))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn process_payment(
    State(state): State<AppState>,
    Json(details): Json<PaymentDetails>,
) -> Result<Json<Value>, PaymentError> {
    // phone format: 2547XXXXXXXX
    let phone = details.phone.filter(|p| !p.is_empty());
    let amount = details
        .amount
        .filter(|a| a.as_f64().is_some_and(|v| v > 0.0));
    let (Some(phone), Some(amount)) = (phone, amount) else {
        return Err(PaymentError::Validation("Phone and amount required".into()));
    };

    let processor = MpesaPaymentProcessor::new(&state.merchant, &state.http, &phone, amount);
    let data = processor.handle_payment().await?;

    Ok(Json(json!({
        "success": true,
        "data": data,
        "message": "STK Push sent! Check your phone."
    })))
}

// Safaricom POSTs the payment result here. Body looks like:
// { Body: { stkCallback: { ResultCode: 0 or 1032, CallbackMetadata, ... } } }
async fn call_back_url(body: Bytes) -> Json<Value> {
    match serde_json::from_slice::<Value>(&body) {
        Ok(v) => info!(
            "Saf says:: {}",
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
        ),
        Err(_) => info!("Saf says:: {}", String::from_utf8_lossy(&body)),
    }
    Json(json!({ "success": true }))
}
