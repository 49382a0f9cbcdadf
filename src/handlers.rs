pub mod dashboard;
pub mod exports;
pub mod forecast;
pub mod health;
pub mod history;
pub mod predictions;
pub mod region_growth;
pub mod regions;
