use std::env;

const SANDBOX_BASE: &str = "https://sandbox.safaricom.co.ke";

/// Daraja credentials for the merchant this server fronts. Loaded once at
/// startup and handed to every `MpesaPaymentProcessor`.
#[derive(Clone)]
pub struct Merchant {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub short_code: String,
    pub pass_key: String,
    pub callback_url: String,
    pub api_base: String,
}

impl Merchant {
    pub fn from_env() -> Self {
        Merchant {
            consumer_key: required("MPESA_CONSUMER_KEY"),
            consumer_secret: required("MPESA_CONSUMER_SECRET"),
            short_code: required("MPESA_SHORTCODE"),
            pass_key: required("MPESA_PASSKEY"),
            callback_url: required("MPESA_CALLBACK_URL"),
            api_base: env::var("MPESA_BASE_URL").unwrap_or_else(|_| SANDBOX_BASE.to_owned()),
        }
    }
}

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("{name} not set"))
}
