pub mod user {
    pub mod handle;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}

pub mod friend {
    pub mod handle;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}

pub mod post {
    pub mod handle;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}

pub mod feed {
    pub mod cache;
    pub mod service;
    pub mod worker;
}

pub mod websocket {
    pub mod handle;
}

pub mod dialog {
    pub mod handle;
    pub mod model;
    pub mod proxy;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod saga;
    pub mod schema;
    pub mod service;
    pub mod worker;
}

pub mod counter {
    pub mod handle;
    pub mod model;
    pub mod proxy;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod service;
    pub mod worker;
}
