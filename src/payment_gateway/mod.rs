pub mod merchant_portal;
pub mod mpesa_payment_gateway;
