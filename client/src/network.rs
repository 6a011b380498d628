use crate::input::InputPlanner;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{InputMessage, Outcome, ServerMessage};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the client saw during one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub phrase: Option<String>,
    pub speeds: Vec<u64>,
    pub outcome: Option<Outcome>,
    pub input_cleared: bool,
}

pub struct Client {
    ws: WsStream,
    delay: Duration,
    planner: InputPlanner,
}

impl Client {
    /// Opens a session, presenting `origin` as the frontend origin
    pub async fn connect(
        url: &str,
        origin: &str,
        delay: Duration,
        typo_rate: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut request = url.into_client_request()?;
        request
            .headers_mut()
            .insert("Origin", HeaderValue::from_str(origin)?);

        info!("Connecting to {}...", url);
        let (ws, _) = connect_async(request).await?;
        info!("Connected");

        Ok(Client {
            ws,
            delay,
            planner: InputPlanner::new(typo_rate),
        })
    }

    /// Waits for the phrase, types it, and collects updates until the verdict arrives
    pub async fn run(self) -> Result<SessionSummary, Box<dyn std::error::Error>> {
        let (sink, mut stream) = self.ws.split();
        let mut summary = SessionSummary::default();
        let mut typist = None;
        let mut sink = Some(sink);

        while let Some(frame) = stream.next().await {
            let text = match frame? {
                Message::Text(text) => text.as_str().to_owned(),
                Message::Close(_) => break,
                _ => continue,
            };

            match ServerMessage::parse(&text) {
                Some(ServerMessage::TextToType(phrase)) => {
                    info!("Phrase to type: {}", phrase);
                    let snapshots = self.planner.plan(&phrase, &mut StdRng::from_entropy());
                    summary.phrase = Some(phrase);

                    if let Some(sink) = sink.take() {
                        typist = Some(tokio::spawn(type_snapshots(sink, snapshots, self.delay)));
                    }
                }
                Some(ServerMessage::Speed(speed)) => {
                    info!("Speed: {}", speed);
                    summary.speeds.push(speed);
                }
                Some(ServerMessage::Verdict(outcome)) => {
                    info!("{}", outcome.verdict_text());
                    summary.outcome = Some(outcome);
                }
                Some(ServerMessage::ClearInput) => {
                    summary.input_cleared = true;
                    break;
                }
                None => warn!("Unrecognized message: {}", text),
            }
        }

        if let Some(typist) = typist {
            typist.abort();
        }

        Ok(summary)
    }
}

async fn type_snapshots(
    mut sink: SplitSink<WsStream, Message>,
    snapshots: Vec<String>,
    delay: Duration,
) {
    for snapshot in snapshots {
        let payload = InputMessage::new(snapshot).to_json();
        if let Err(e) = sink.send(Message::text(payload)).await {
            error!("Failed to send input: {}", e);
            return;
        }
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}
