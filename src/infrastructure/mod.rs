pub mod adapters;
pub mod web;
