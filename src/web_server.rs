use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware, web};

use crate::config::ServerConfig;
use crate::routes::{json_error_handler, post_grader_handler};
use crate::runner::SubmissionRunner;

pub fn build_server(
    server_config: ServerConfig,
    runner: Arc<SubmissionRunner>,
) -> std::io::Result<Server> {
    let runner = web::Data::from(runner);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(runner.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(middleware::Logger::default())
            .service(web::resource("/api/v1/grader").route(web::post().to(post_grader_handler)))
    })
    .bind(server_config.bind())?
    .run();

    Ok(server)
}
