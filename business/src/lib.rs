pub mod application {
    pub mod scan {
        pub mod get_history;
        pub mod predict;
    }
}

pub mod domain {
    pub mod errors;
    pub mod logger;
    pub mod scan {
        pub mod errors;
        pub mod model;
        pub mod repository;
        pub mod services;
        pub mod value_objects;
        pub mod use_cases {
            pub mod get_history;
            pub mod predict;
        }
    }
}
