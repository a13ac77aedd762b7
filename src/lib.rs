//! Backend for a kids' coding-camp curriculum: students work through a
//! 12-week course plan, submit lesson code and earn achievements. The crate
//! exposes the domain types, a swappable storage layer, the derived
//! progress/unlock evaluation and the actix endpoint registration.

pub mod api;
mod http_res;
mod model;
pub mod progress;
pub mod run;
pub mod schema;
pub mod seed;
pub mod storage;
