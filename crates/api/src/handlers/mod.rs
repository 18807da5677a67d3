pub mod cities;
pub mod comments;
pub mod entries;
pub mod tags;
