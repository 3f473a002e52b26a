use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::types::HealthStatus;
use crate::api::ApiClient;
use crate::config::Config;
use crate::polling::ViewState;
use crate::routes::Route;
use crate::settings::SettingsForm;
use crate::views::{DashboardView, HealthView, MarketDetailView, MarketsView};

/// The mounted view for the current route. Dropping it stops its polling.
pub enum Screen {
    Dashboard(DashboardView),
    Markets(MarketsView),
    MarketDetail(MarketDetailView),
    Settings(SettingsForm),
    Login,
    NotFound,
}

/// Work finished off the UI thread, drained on every tick.
#[derive(Debug)]
pub enum AppEvent {
    Unauthorized,
    SettingsSaved { mount: u64, result: Result<(), String> },
}

pub struct App {
    client: Arc<ApiClient>,
    config: Config,
    route: Route,
    screen: Screen,
    health: HealthView,
    history: Vec<Route>,
    login_input: String,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    // Bumped per settings mount so a save finishing after navigation is ignored.
    settings_mount: u64,
    status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Must be called inside a tokio runtime; mounting starts polling tasks.
    pub fn new(
        client: Arc<ApiClient>,
        config: Config,
        events_tx: mpsc::UnboundedSender<AppEvent>,
        events_rx: mpsc::UnboundedReceiver<AppEvent>,
        start: Route,
    ) -> Self {
        let health = HealthView::mount(client.clone(), config.polling.health_interval());
        let mut app = Self {
            client,
            config,
            route: start.clone(),
            screen: Screen::NotFound,
            health,
            history: Vec::new(),
            login_input: String::new(),
            events_tx,
            events_rx,
            settings_mount: 0,
            status_message: None,
            should_quit: false,
        };
        app.screen = app.mount(&start);
        app
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn base_path(&self) -> &str {
        &self.config.ui.base_path
    }

    pub fn login_input(&self) -> &str {
        &self.login_input
    }

    pub fn health(&self) -> ViewState<HealthStatus> {
        self.health.state()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn mount(&mut self, route: &Route) -> Screen {
        let polling = &self.config.polling;
        match route {
            Route::Dashboard => {
                Screen::Dashboard(DashboardView::mount(self.client.clone(), polling.dashboard_interval()))
            }
            Route::Markets => Screen::Markets(MarketsView::mount(
                self.client.clone(),
                polling.markets_interval(),
                self.config.ui.rows_per_page,
            )),
            Route::MarketDetail(id) => Screen::MarketDetail(MarketDetailView::mount(
                self.client.clone(),
                id.clone(),
                polling.market_detail_interval(),
            )),
            Route::Settings => {
                self.settings_mount += 1;
                Screen::Settings(SettingsForm::new(Duration::from_millis(
                    self.config.ui.notification_ttl_ms,
                )))
            }
            Route::Login => {
                self.login_input.clear();
                Screen::Login
            }
            Route::NotFound(_) => Screen::NotFound,
        }
    }

    fn switch_to(&mut self, route: Route) {
        info!("Navigating to {}", route.full_path(&self.config.ui.base_path));
        // Stop the old view's polling before the new one starts.
        self.screen = Screen::NotFound;
        self.screen = self.mount(&route);
        self.route = route;
        self.status_message = None;
    }

    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        let previous = std::mem::replace(&mut self.route, route.clone());
        if previous != Route::Login {
            self.history.push(previous);
        }
        self.switch_to(route);
    }

    pub fn back(&mut self) {
        let target = self.history.pop().unwrap_or(Route::Dashboard);
        if target != self.route {
            self.switch_to(target);
        }
    }

    /// Apply background results and keep screen state consistent with fresh data.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::Unauthorized => {
                    if self.route != Route::Login {
                        warn!("Session expired; redirecting to login");
                        self.navigate(Route::Login);
                        self.status_message = Some("Session expired, please sign in".to_string());
                    }
                }
                AppEvent::SettingsSaved { mount, result } => {
                    if let Screen::Settings(form) = &mut self.screen {
                        if mount == self.settings_mount {
                            form.finish_save(result);
                        }
                    }
                }
            }
        }

        match &mut self.screen {
            Screen::Markets(view) => view.sync(),
            Screen::Settings(form) => form.expire_notification(now),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Screens with text input get every key first.
        let editing = matches!(&self.screen, Screen::Settings(form) if form.is_editing());
        if matches!(self.screen, Screen::Login) {
            return self.handle_login_key(key);
        }
        if editing {
            return self.handle_settings_key(key);
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.navigate(Route::Dashboard),
            KeyCode::Char('2') => self.navigate(Route::Markets),
            KeyCode::Char('3') => self.navigate(Route::Settings),
            KeyCode::Esc => self.back(),
            _ => match self.screen {
                Screen::Markets(_) => self.handle_markets_key(key),
                Screen::Settings(_) => self.handle_settings_key(key),
                _ => {}
            },
        }
    }

    fn handle_markets_key(&mut self, key: KeyEvent) {
        let Screen::Markets(view) = &mut self.screen else {
            return;
        };
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => view.select_next(),
            KeyCode::Char('k') | KeyCode::Up => view.select_prev(),
            KeyCode::Char('n') | KeyCode::Right => view.next_page(),
            KeyCode::Char('p') | KeyCode::Left => view.prev_page(),
            KeyCode::Char('r') => view.cycle_rows_per_page(),
            KeyCode::Enter => {
                if let Some(id) = view.selected_market_id() {
                    self.navigate(Route::MarketDetail(Some(id)));
                }
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        let Screen::Settings(form) = &mut self.screen else {
            return;
        };

        if form.is_editing() {
            match key.code {
                KeyCode::Char(c) => form.push_char(c),
                KeyCode::Backspace => form.pop_char(),
                KeyCode::Esc => form.cancel_edit(),
                KeyCode::Enter => {
                    // Failures surface as a form notification.
                    let _ = form.commit_edit();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => form.select_next(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => form.select_prev(),
            KeyCode::Enter | KeyCode::Char(' ') => form.activate(),
            KeyCode::Char('x') => form.dismiss_notification(),
            KeyCode::Char('s') => {
                if let Some(settings) = form.begin_save() {
                    info!("Saving settings: {:?}", settings);
                    let client = self.client.clone();
                    let tx = self.events_tx.clone();
                    let mount = self.settings_mount;
                    tokio::spawn(async move {
                        let result = client
                            .save_settings(&settings)
                            .await
                            .map(|_| ())
                            .map_err(|e| e.to_string());
                        let _ = tx.send(AppEvent::SettingsSaved { mount, result });
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.login_input.push(c),
            KeyCode::Backspace => {
                self.login_input.pop();
            }
            KeyCode::Esc => self.back(),
            KeyCode::Enter => self.submit_login(),
            _ => {}
        }
    }

    fn submit_login(&mut self) {
        let token = self.login_input.trim().to_string();
        if token.is_empty() {
            self.status_message = Some("Token cannot be empty".to_string());
            return;
        }
        match self.client.auth().set_token(&token) {
            Ok(()) => {
                info!("Signed in with a new API token");
                self.login_input.clear();
                self.history.clear();
                self.navigate(Route::Dashboard);
            }
            Err(e) => {
                warn!("Failed to store API token: {:#}", e);
                self.status_message = Some("Failed to store token".to_string());
            }
        }
    }
}
