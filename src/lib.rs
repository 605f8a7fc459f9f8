pub mod config;
pub mod error;
pub mod domain {
    pub mod payment;
    pub mod provider;
    pub mod summary;
}
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
        pub mod summary;
    }
    pub mod routes;
}
pub mod processors;
pub mod service {
    pub mod admission_queue;
    pub mod dispatch_worker;
    pub mod health_monitor;
    pub mod payment_service;
    pub mod provider_selector;
}
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
}
