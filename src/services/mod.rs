//! Typed wrappers over backend endpoints
//!
//! Each service borrows a shared [`ApiClient`](crate::client::ApiClient), so
//! every call goes through the same bearer-token and refresh handling.

mod auth;
mod billing;
mod clinics;
mod features;
mod reminders;
mod wellness;

pub use auth::{AuthService, RegisterRequest, UserProfile};
pub use billing::{BillingCycle, BillingService, CheckoutSession, SubscriptionStatus};
pub use clinics::{Clinic, ClinicService, Coordinates, NearbyQuery, DEFAULT_RADIUS_KM};
pub use features::{FeatureService, Surface, SurfaceAccess};
pub use reminders::{
    Frequency, NewReminder, Reminder, ReminderService, ReminderType, ReminderUpdate,
};
pub use wellness::{MoodEntry, WellnessService};
