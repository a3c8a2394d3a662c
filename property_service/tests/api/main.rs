mod health_check;
mod helpers;
mod properties;
mod recommendations;
