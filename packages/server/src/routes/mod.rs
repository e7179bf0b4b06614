use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{contest, health, payment, user};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health::root))
        .merge(user_routes())
        .merge(contest_routes())
        .merge(payment_routes())
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user::create_user, user::list_users))
        .routes(routes!(user::update_user_role))
        .routes(routes!(user::get_user_profile))
        .routes(routes!(user::update_user_profile))
}

fn contest_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(contest::create_contest, contest::list_contests))
        .routes(routes!(
            contest::get_contest,
            contest::update_contest,
            contest::delete_contest
        ))
        .routes(routes!(contest::approve_contest))
        .routes(routes!(contest::reject_contest))
        .routes(routes!(contest::register_for_contest))
        .routes(routes!(contest::submit_task))
        .routes(routes!(contest::set_winner))
        .routes(routes!(contest::contest_stats))
}

fn payment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(payment::create_checkout_session))
        .routes(routes!(payment::get_payment_session))
}
