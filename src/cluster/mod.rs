pub mod address;
pub mod cluster_events;
pub mod cluster_view;
pub mod downing_strategy;
pub mod member;
pub mod resolver_config;
pub mod stability_gate;
