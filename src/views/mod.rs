//! Main-application view counts for event listings and details.

pub mod view_count;

pub use view_count::{
    ConfirmedRequestCounter, EVENTS_URI_PREFIX, ViewCountJoin, Viewable, WithCounters, event_uri,
    parse_event_id,
};
