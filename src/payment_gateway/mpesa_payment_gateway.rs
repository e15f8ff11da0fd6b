use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use log::error;
use serde_json::{json, Number, Value};

use super::merchant_portal::Merchant;
use crate::error::PaymentError;

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Drives one STK push end to end: token exchange, password derivation,
/// payload submission. A fresh token is fetched per push; Daraja rejects the
/// push itself if the token has gone stale.
pub struct MpesaPaymentProcessor<'a> {
    merchant: &'a Merchant,
    http: &'a reqwest::Client,
    phone: &'a str,
    amount: Number,
}

impl<'a> MpesaPaymentProcessor<'a> {
    pub fn new(
        merchant: &'a Merchant,
        http: &'a reqwest::Client,
        phone: &'a str,
        amount: Number,
    ) -> Self {
        MpesaPaymentProcessor {
            merchant,
            http,
            phone,
            amount,
        }
    }

    pub async fn get_access_token(&self) -> Result<String, PaymentError> {
        let auth = BASE64.encode(format!(
            "{}:{}",
            self.merchant.consumer_key, self.merchant.consumer_secret
        ));
        let res = self
            .http
            .get(format!(
                "{}/oauth/v1/generate?grant_type=client_credentials",
                self.merchant.api_base
            ))
            .header("Authorization", format!("Basic {auth}"))
            .send()
            .await?;
        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            error!("Token error: {body}");
            return Err(PaymentError::UpstreamAuth);
        }
        let token: TokenResponse = res.json().await?;
        Ok(token.access_token)
    }

    pub async fn handle_payment(&self) -> Result<Value, PaymentError> {
        let token = self.get_access_token().await?;

        // One instant for both the Timestamp field and the password, so the
        // two can never disagree across a second boundary.
        let now = Utc::now();
        let timestamp = timestamp(&now);
        let password = generate_password(
            &self.merchant.short_code,
            &self.merchant.pass_key,
            &timestamp,
        );

        let payload = json!({
            "BusinessShortCode": self.merchant.short_code,
            "Password": password,
            "Timestamp": timestamp,
            "TransactionType": "CustomerPayBillOnline",
            "Amount": self.amount,
            "PartyA": self.phone,
            "PartyB": self.merchant.short_code,
            "PhoneNumber": self.phone,
            "CallBackURL": self.merchant.callback_url,
            "AccountReference": format!("TestPayment-{}", now.timestamp_millis()),
            "TransactionDesc": "Payment for goods/services",
        });

        let res = self
            .http
            .post(format!(
                "{}/mpesa/stkpush/v1/processrequest",
                self.merchant.api_base
            ))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let body: Value = res.json().await.unwrap_or(Value::Null);
            error!("STK push rejected: {body}");
            let message = body
                .get("errorMessage")
                .and_then(Value::as_str)
                .unwrap_or("Failed to initiate payment")
                .to_owned();
            return Err(PaymentError::UpstreamPush(message));
        }
        Ok(res.json().await?)
    }
}

/// Compact UTC timestamp, YYYYMMDDHHmmss.
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// base64(shortcode + passkey + timestamp), the per-request password Daraja
/// expects alongside the matching Timestamp field.
pub fn generate_password(short_code: &str, pass_key: &str, timestamp: &str) -> String {
    BASE64.encode(format!("{short_code}{pass_key}{timestamp}"))
}
