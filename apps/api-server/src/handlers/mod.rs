//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod feed;
mod health;
mod posts;
mod profiles;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/dev-token", web::post().to(auth::dev_token))
                    .route("/session", web::post().to(auth::sign_in))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/feed/sessions")
                    .route("", web::post().to(feed::create_session))
                    .route("/{id}", web::get().to(feed::get_session))
                    .route("/{id}", web::delete().to(feed::delete_session))
                    .route("/{id}/next", web::post().to(feed::next_page))
                    .route("/{id}/visible", web::post().to(feed::sentinel_visible)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/like", web::post().to(posts::toggle_like))
                    .route("/{id}/bookmark", web::post().to(posts::toggle_bookmark))
                    .route("/{id}/share", web::get().to(posts::share_link))
                    .route("/{id}/comments", web::get().to(comments::list_comments))
                    .route("/{id}/comments", web::post().to(comments::add_comment))
                    .route("/{id}/comments/stream", web::get().to(comments::stream_comments)),
            )
            .service(
                web::scope("/profiles")
                    .route("/by-username/{username}", web::get().to(profiles::get_by_username))
                    .route("/{uid}", web::get().to(profiles::get_profile)),
            ),
    );
}
