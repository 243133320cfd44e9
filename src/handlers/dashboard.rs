//! Admin root: site name and the resolved navigation menu.

use crate::state::AdminState;
use crate::view::DashboardView;
use axum::{extract::State, Json};

pub async fn index(State(admin): State<AdminState>) -> Json<DashboardView> {
    Json(DashboardView {
        name: admin.name().to_string(),
        menu: admin.menu().to_vec(),
    })
}
