// External collaborators reached over the network
pub mod email;
pub mod geocoder;

pub use email::{EmailService, Mailer, OutgoingEmail};
pub use geocoder::{GeoLocation, Geocoder, MapQuestGeocoder};
