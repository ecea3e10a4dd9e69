mod bus;
mod favorite;
mod feedback;
mod lenient;
mod stop;

pub use bus::{Bus, BusTiming, BusType, RawRoute};
pub use favorite::{Favorite, DEFAULT_USER_ID};
pub use feedback::{Feedback, FeedbackStatus, FeedbackType};
pub use stop::{Coordinates, Stop};
