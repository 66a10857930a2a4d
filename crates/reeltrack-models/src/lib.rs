pub mod activity;
pub mod layout;
pub mod media;
pub mod profile;
pub mod status;
pub mod watch_item;

pub use activity::{ActivityEntry, ActivityKind};
pub use layout::DatabaseLayout;
pub use media::MediaKind;
pub use profile::UserProfile;
pub use status::{DisplayStatus, LegacyStatus, StatusFlags};
pub use watch_item::{keys, RawWatchItem, RecordShape};
