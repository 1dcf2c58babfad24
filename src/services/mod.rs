pub mod checkout;
pub mod incoming;
pub mod merchant;
pub mod report;
pub mod signature;

pub use checkout::CheckoutService;
pub use incoming::IncomingService;
pub use merchant::MerchantClient;
pub use report::ReportService;
pub use signature::WebhookVerifier;
