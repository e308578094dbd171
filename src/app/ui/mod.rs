mod controls;
mod fps;
mod metrics;
mod panels;
