// Route handlers.
// Each feature gets its own file.

pub mod cron;

pub mod startups;

pub mod contacts;

pub mod saved_startups;

pub mod investments;
