use chrono::Datelike;
use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, pick_list, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Size, Subscription, Task,
    Theme,
};
use ndvicore::dashboard::view::{BoundaryLayer, MarkerLayer, RasterLayer};
use ndvicore::dashboard::{ChartSeries, Palette};
use ndvicore::geo::GeoPoint;
use ndvicore::DashboardView;
use projection::MapProjection;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

mod projection;

const BRIDGE_URL: &str = "http://127.0.0.1:9000";

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(state: &Visualizer) -> String {
    state
        .dashboard
        .as_ref()
        .map(|view| view.title.clone())
        .unwrap_or_else(|| "NDVI Dashboard".into())
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    dashboard: Option<DashboardView>,
    lon: String,
    lat: String,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    ViewFetched(Result<BridgeReply, String>),
    YearSelected(String),
    LonChanged(String),
    LatChanged(String),
    InspectPressed,
    MapClicked(GeoPoint),
    ExportPressed,
    ActionDone(&'static str, Result<BridgeReply, String>),
}

/// Reply envelope served by the simulator bridge.
#[derive(Debug, Clone, Deserialize)]
struct BridgeReply {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    token: Option<u64>,
    view: DashboardView,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                dashboard: None,
                lon: "90.4125".into(),
                lat: "23.8103".into(),
                status: "Waiting for dashboard...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_view(), Message::ViewFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_view(), Message::ViewFetched),
            Message::ViewFetched(Ok(reply)) => {
                state.dashboard = Some(reply.view);
                Task::none()
            }
            Message::ViewFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::YearSelected(year) => {
                state.push_history(format!("Year {year} selected"));
                Task::perform(
                    post_action("year", json!({ "year": year })),
                    |result| Message::ActionDone("year", result),
                )
            }
            Message::LonChanged(value) => {
                state.lon = value;
                Task::none()
            }
            Message::LatChanged(value) => {
                state.lat = value;
                Task::none()
            }
            Message::InspectPressed => match (state.lon.trim().parse(), state.lat.trim().parse()) {
                (Ok(lon), Ok(lat)) if GeoPoint::new(lon, lat).is_finite() => {
                    Self::inspect(state, GeoPoint::new(lon, lat))
                }
                _ => {
                    state.status = "Enter a numeric longitude and latitude".into();
                    Task::none()
                }
            },
            Message::MapClicked(point) => {
                state.lon = format!("{:.4}", point.lon);
                state.lat = format!("{:.4}", point.lat);
                Self::inspect(state, point)
            }
            Message::ExportPressed => Task::perform(post_action("export", json!({})), |result| {
                Message::ActionDone("export", result)
            }),
            Message::ActionDone(action, Ok(reply)) => {
                let note = match (&reply.task_id, reply.token) {
                    (Some(task), _) => format!("{action}: {} queued", task),
                    (None, Some(token)) => format!("{action}: request #{token}"),
                    (None, None) => format!("{action}: {}", reply.status),
                };
                state.status = note.clone();
                state.push_history(note);
                state.dashboard = Some(reply.view);
                Task::none()
            }
            Message::ActionDone(action, Err(err)) => {
                state.status = format!("{action} failed: {err}");
                state.push_history(state.status.clone());
                Task::none()
            }
        }
    }

    fn inspect(state: &mut Self, point: GeoPoint) -> Task<Message> {
        state.push_history(format!("Inspect {:.4}, {:.4}", point.lon, point.lat));
        Task::perform(
            post_action("inspect", json!({ "lon": point.lon, "lat": point.lat })),
            |result| Message::ActionDone("inspect", result),
        )
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let Some(dashboard) = &state.dashboard else {
            return Container::new(text(&state.status).size(18))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };

        let selected = Some(dashboard.selected_year.to_string());
        let year_picker = pick_list(dashboard.years.clone(), selected, Message::YearSelected)
            .placeholder("Year")
            .padding(6);

        let export_button = button(text(dashboard.export.label.clone()))
            .on_press_maybe(dashboard.export.enabled.then_some(Message::ExportPressed))
            .padding(10);

        let inspection = &dashboard.inspection;
        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let control_column = column![
            text(dashboard.title.clone()).size(24),
            text("Select Year").size(16),
            year_picker,
            text(inspection.prompt.clone()).size(14),
            row![
                text_input("Longitude", &state.lon)
                    .on_input(Message::LonChanged)
                    .padding(6),
                text_input("Latitude", &state.lat)
                    .on_input(Message::LatChanged)
                    .padding(6),
            ]
            .spacing(6),
            button("Inspect").on_press(Message::InspectPressed).padding(8),
            text(inspection.value.clone()).size(14),
            text(inspection.class.clone()).size(14),
            text(inspection.availability.clone()).size(14),
            export_button,
            text(dashboard.export.status.clone()).size(14),
            text(&state.status).size(12),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(140.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let map = Canvas::new(NdviMap {
            raster: dashboard.layers.ndvi.clone(),
            boundary: dashboard.layers.boundary.clone(),
            marker: dashboard.layers.marker,
        })
        .width(Length::Fill)
        .height(Length::Fixed(460.0));

        let point_chart_title = dashboard
            .point_chart
            .as_ref()
            .map(|chart| chart.title.clone())
            .unwrap_or_else(|| "Click a pixel for its time series".into());

        let map_column = column![
            text(format!("{} ({})", dashboard.layers.ndvi.name, dashboard.selected_year)).size(18),
            map,
            text(point_chart_title).size(16),
            Canvas::new(ChartCanvas {
                series: dashboard.point_chart.clone(),
                color: Color::from_rgb(0.40, 0.78, 0.30),
            })
            .width(Length::Fill)
            .height(Length::Fixed(160.0)),
            text(dashboard.annual_chart.title.clone()).size(16),
            Canvas::new(ChartCanvas {
                series: Some(dashboard.annual_chart.clone()),
                color: Color::from_rgb(0.18, 0.72, 0.89),
            })
            .width(Length::Fill)
            .height(Length::Fixed(160.0)),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![control_column, map_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

async fn fetch_view() -> Result<BridgeReply, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/view"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<BridgeReply>()
        .await
        .map_err(|e| e.to_string())
}

async fn post_action(path: &str, body: serde_json::Value) -> Result<BridgeReply, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{BRIDGE_URL}/{path}"))
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    let reply = response
        .json::<BridgeReply>()
        .await
        .map_err(|e| format!("{status}: {e}"))?;
    if status.is_success() {
        Ok(reply)
    } else {
        log::warn!("{path} rejected with {status}");
        Err(format!(
            "{}: {}",
            status,
            reply.message.unwrap_or_default()
        ))
    }
}

fn rgb(color: [u8; 3]) -> Color {
    Color::from_rgb8(color[0], color[1], color[2])
}

#[derive(Clone)]
struct NdviMap {
    raster: RasterLayer,
    boundary: BoundaryLayer,
    marker: Option<MarkerLayer>,
}

impl NdviMap {
    fn projection(&self, bounds: Rectangle) -> Option<MapProjection> {
        MapProjection::fit(self.raster.grid.extent(), bounds)
    }
}

impl canvas::Program<Message> for NdviMap {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event else {
            return None;
        };
        let position = cursor.position_in(bounds)?;
        let projection = self.projection(bounds)?;
        let point = projection.to_geo(position);
        if !self.raster.grid.extent().contains(point) {
            return None;
        }
        Some(canvas::Action::publish(Message::MapClicked(point)).and_capture())
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.07),
        );

        let Some(projection) = self.projection(bounds) else {
            return vec![frame.into_geometry()];
        };

        let palette = Palette::ndvi();
        let grid = self.raster.grid;
        let cell = grid.cell_size as f32 * projection.scale();
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let Some(value) = self.raster.cell(row, col) else {
                    continue;
                };
                let center = projection.to_screen(grid.cell_center(row, col));
                frame.fill_rectangle(
                    Point::new(center.x - cell / 2.0, center.y - cell / 2.0),
                    Size::new(cell, cell),
                    rgb(palette.color_at(value)),
                );
            }
        }

        for ring in &self.boundary.rings {
            let outline = Path::new(|builder| {
                for (i, vertex) in ring.iter().enumerate() {
                    let point = projection.to_screen(*vertex);
                    if i == 0 {
                        builder.move_to(point);
                    } else {
                        builder.line_to(point);
                    }
                }
                builder.close();
            });
            frame.stroke(
                &outline,
                Stroke::default().with_width(2.0).with_color(Color::BLACK),
            );
        }

        if let Some(marker) = &self.marker {
            let center = projection.to_screen(marker.point);
            let dot = Path::new(|builder| builder.circle(center, 6.0));
            frame.fill(&dot, rgb(marker.color.rgb()));
            frame.stroke(&dot, Stroke::default().with_color(Color::BLACK));
        }

        vec![frame.into_geometry()]
    }
}

#[derive(Clone)]
struct ChartCanvas {
    series: Option<ChartSeries>,
    color: Color,
}

impl canvas::Program<Message> for ChartCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let Some(series) = &self.series else {
            return vec![frame.into_geometry()];
        };
        let (Some(first), Some(last)) = (series.points.first(), series.points.last()) else {
            return vec![frame.into_geometry()];
        };
        let Some((min, max)) = series.value_range() else {
            return vec![frame.into_geometry()];
        };

        let start = first.date.num_days_from_ce() as f32;
        let span = (last.date.num_days_from_ce() as f32 - start).max(1.0);
        let range = (max - min).max(0.05);
        let margin = 8.0;
        let width = bounds.width - 2.0 * margin;
        let height = bounds.height - 2.0 * margin;
        let project = |days: i32, value: f32| {
            Point::new(
                margin + (days as f32 - start) / span * width,
                margin + height - (value - min) / range * height,
            )
        };

        // Nulls break the line.
        let path = Path::new(|builder| {
            let mut pen_down = false;
            for point in &series.points {
                match point.value {
                    Some(value) => {
                        let target = project(point.date.num_days_from_ce(), value);
                        if pen_down {
                            builder.line_to(target);
                        } else {
                            builder.move_to(target);
                        }
                        pen_down = true;
                    }
                    None => pen_down = false,
                }
            }
        });
        frame.stroke(&path, Stroke::default().with_width(2.0).with_color(self.color));

        for point in &series.points {
            if let Some(value) = point.value {
                let dot = Path::new(|builder| {
                    builder.circle(project(point.date.num_days_from_ce(), value), 3.0)
                });
                frame.fill(&dot, self.color);
            }
        }

        vec![frame.into_geometry()]
    }
}
