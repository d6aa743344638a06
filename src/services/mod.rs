// Services module - business logic layer

pub mod diagnostics;
pub mod inquiry_service;
pub mod menu_seeder;
pub mod menu_service;

pub use diagnostics::DiagnosticsService;
pub use inquiry_service::InquiryService;
pub use menu_seeder::{MenuSeeder, SeedOutcome};
pub use menu_service::{fallback_menu, MenuService};
