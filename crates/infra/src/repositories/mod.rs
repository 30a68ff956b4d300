//! Repository and unit-of-work implementations over [`crate::db::MyContext`].
//!
//! All three share one context per request, so changes staged through either
//! repository are committed together by the unit of work.

pub mod city;
pub mod country;
pub mod unit_of_work;

pub use city::InMemoryCityRepository;
pub use country::InMemoryCountryRepository;
pub use unit_of_work::InMemoryUnitOfWork;
