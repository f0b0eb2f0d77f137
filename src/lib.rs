pub mod shared {
    pub mod core {
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod database;
    }
}

pub mod modules {
    pub mod trackers {
        pub mod core {
            pub mod mutation;
            pub mod ports;
            pub mod tracker;
        }
        pub mod application {
            pub mod cancellation;
            pub mod errors;
        }
        pub mod use_cases {
            pub mod get_tracker {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod list_trackers {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod create_tracker {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod update_tracker {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod delete_tracker {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
        pub mod adapters {
            pub mod inbound {
                pub mod graphql;
                pub mod http;
            }
            pub mod outbound {
                pub mod tracker_store_in_memory;
                pub mod tracker_store_sqlite;
            }
        }
    }
}

pub mod shell;
