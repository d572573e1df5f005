use crate::dashboard::controller::Dashboard;
use crate::dashboard::inspector::{InspectionResponse, RequestToken};
use crate::dashboard::selection::YearInput;
use crate::dashboard::view::DashboardView;
use crate::geo::GeoPoint;
use crate::imagery::ExportReceipt;
use crate::prelude::{DashboardError, DashboardResult};
use crate::telemetry::LogManager;
use tokio::sync::{mpsc, oneshot, watch};

enum Command {
    SelectYear(YearInput, oneshot::Sender<DashboardResult<i32>>),
    Inspect(GeoPoint, oneshot::Sender<RequestToken>),
    Export(oneshot::Sender<DashboardResult<Option<ExportReceipt>>>),
}

/// Serialises user actions and provider responses onto one task.
///
/// Provider round trips run on the blocking pool and post their responses
/// back here, so the dashboard is never touched concurrently.
pub struct DashboardLoop {
    dashboard: Dashboard,
    commands: mpsc::UnboundedReceiver<Command>,
    responses_tx: mpsc::UnboundedSender<InspectionResponse>,
    responses: mpsc::UnboundedReceiver<InspectionResponse>,
    view: watch::Sender<DashboardView>,
    logger: LogManager,
}

/// Cloneable front end to a running [`DashboardLoop`].
#[derive(Clone)]
pub struct DashboardHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<DashboardView>,
}

impl DashboardLoop {
    pub fn new(dashboard: Dashboard) -> (Self, DashboardHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (responses_tx, responses) = mpsc::unbounded_channel();
        let (view, view_rx) = watch::channel(dashboard.view());
        let event_loop = Self {
            dashboard,
            commands,
            responses_tx,
            responses,
            view,
            logger: LogManager::scoped("loop"),
        };
        let handle = DashboardHandle {
            commands: commands_tx,
            view: view_rx,
        };
        (event_loop, handle)
    }

    /// Runs until every handle is dropped, then hands the dashboard back.
    pub async fn run(mut self) -> Dashboard {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(response) = self.responses.recv() => {
                    self.dashboard.apply(response);
                    self.publish();
                }
            }
        }
        self.logger.record("all handles dropped, stopping");
        self.dashboard
    }

    fn publish(&self) {
        self.view.send_replace(self.dashboard.view());
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SelectYear(input, reply) => {
                let result = self.dashboard.select_year(input);
                self.publish();
                let _ = reply.send(result);
            }
            Command::Inspect(point, reply) => {
                let requests = self.dashboard.inspect(point);
                let token = self.dashboard.inspection().map(|i| i.token).unwrap_or_default();
                let provider = self.dashboard.provider();
                for request in requests {
                    let provider = provider.clone();
                    let responses = self.responses_tx.clone();
                    tokio::task::spawn_blocking(move || {
                        let _ = responses.send(request.execute(provider.as_ref()));
                    });
                }
                self.publish();
                let _ = reply.send(token);
            }
            Command::Export(reply) => {
                let result = self.dashboard.export();
                self.publish();
                let _ = reply.send(result);
            }
        }
    }
}

impl DashboardHandle {
    pub async fn select_year(&self, year: impl Into<YearInput>) -> DashboardResult<i32> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SelectYear(year.into(), reply))?;
        rx.await.map_err(|_| DashboardError::LoopClosed)?
    }

    /// Resolves once the click is dispatched, not when its responses land.
    pub async fn inspect(&self, point: GeoPoint) -> DashboardResult<RequestToken> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Inspect(point, reply))?;
        rx.await.map_err(|_| DashboardError::LoopClosed)
    }

    pub async fn export(&self) -> DashboardResult<Option<ExportReceipt>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Export(reply))?;
        rx.await.map_err(|_| DashboardError::LoopClosed)?
    }

    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    /// Waits until the latest inspection has no outstanding responses.
    pub async fn wait_settled(&self) -> DashboardResult<DashboardView> {
        let mut view = self.view.clone();
        let settled = view
            .wait_for(|view| view.pending_requests == 0)
            .await
            .map_err(|_| DashboardError::LoopClosed)?;
        Ok(settled.clone())
    }

    fn send(&self, command: Command) -> DashboardResult<()> {
        self.commands
            .send(command)
            .map_err(|_| DashboardError::LoopClosed)
    }
}
