mod handlers;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::service::ForecastService;

pub async fn start_server(service: ForecastService, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(service);

    println!("Starting Urban Canopy Forecaster API on http://localhost:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .route("/api/health", web::get().to(handlers::health))
            .route("/api/cells", web::get().to(handlers::cells))
            .route(
                "/api/cells/{cell_id}/projection",
                web::get().to(handlers::projection),
            )
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
