use std::convert::Infallible;
use std::net::SocketAddr;

use log::info;
use warp::{Filter, Reply};

use crate::error_handling::types::WebError;
use crate::web_interface::routes::{
    checkout_route, dashboard_route, departments_route, export_report_route, handle_rejection,
    login_page_route, login_route, logout_route, register_visitor_route, reports_route,
    session_route, static_route,
};
use crate::web_interface::types::AppState;

/// HTTP front end: the login page and the JSON API behind the session gate.
pub struct WebServer {
    state: AppState,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Every route, with rejections already turned into responses.
    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let state = self.state.clone();

        let pages = login_page_route().or(static_route());
        let auth = login_route(state.clone())
            .or(logout_route(state.clone()))
            .or(session_route(state.clone()));
        let visitors = register_visitor_route(state.clone()).or(checkout_route(state.clone()));
        let views = dashboard_route(state.clone())
            .or(departments_route(state.clone()))
            .or(reports_route(state.clone()))
            .or(export_report_route(state));

        pages
            .or(auth)
            .or(visitors)
            .or(views)
            .recover(handle_rejection)
    }

    /// Serves on `bind_address:port` until the process is stopped.
    pub async fn start(&self, bind_address: &str, port: u16) -> Result<(), WebError> {
        let addr: SocketAddr = format!("{}:{}", bind_address, port)
            .parse()
            .map_err(|e| WebError::BindFailed(format!("{}:{}: {}", bind_address, port, e)))?;

        info!("Web interface listening on http://{}", addr);
        warp::serve(self.routes()).run(addr).await;
        Ok(())
    }
}
