use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::api::{ApiClient, Backend, LeaderboardKind};
use crate::dialog::ReferenceKind;
use crate::error::ApiResult;
use crate::geocode::postcode_to_coordinates;
use crate::model::Choice;
use crate::state::{Delta, Leaderboards, ProviderCommand};

/// Turns provider commands into deltas by calling the backend.
pub struct Provider<B: Backend> {
    api: ApiClient<B>,
    geocoder_base: String,
}

impl<B: Backend> Provider<B> {
    pub fn new(api: ApiClient<B>, geocoder_base: impl Into<String>) -> Self {
        Self {
            api,
            geocoder_base: geocoder_base.into(),
        }
    }

    /// `None` when the command belongs to a dialog that has since closed.
    pub fn execute(&self, cmd: ProviderCommand) -> Option<Delta> {
        match cmd {
            ProviderCommand::FetchPlayers => Some(Delta::SetPlayers(shown(self.api.players()))),
            ProviderCommand::FetchTeams => Some(Delta::SetTeams(shown(self.api.teams()))),
            ProviderCommand::FetchFixtures => {
                Some(Delta::SetFixtures(shown(self.api.fixtures())))
            }
            ProviderCommand::FetchRecentFixtures => {
                Some(Delta::SetRecentFixtures(shown(self.api.recent_fixtures())))
            }
            ProviderCommand::FetchLeaderboards => {
                Some(Delta::SetLeaderboards(shown(self.leaderboards())))
            }
            ProviderCommand::FetchFixture { id } => {
                let result = shown(self.api.fixture(&id));
                Some(Delta::SetFixture { id, result })
            }
            ProviderCommand::FetchReference { ticket, kind } => {
                if ticket.is_aborted() {
                    return None;
                }
                let result = match kind {
                    ReferenceKind::Teams => self
                        .api
                        .teams()
                        .map(|teams| teams.iter().map(Choice::from).collect()),
                    ReferenceKind::Players => self
                        .api
                        .players()
                        .map(|players| players.iter().map(Choice::from).collect()),
                };
                if ticket.is_aborted() {
                    return None;
                }
                Some(Delta::SetReference {
                    ticket_id: ticket.id(),
                    kind,
                    result: shown(result),
                })
            }
            ProviderCommand::Geocode { ticket, postcode } => {
                if ticket.is_aborted() {
                    return None;
                }
                let coords =
                    postcode_to_coordinates(self.api.backend(), &self.geocoder_base, &postcode);
                if ticket.is_aborted() {
                    return None;
                }
                Some(Delta::Geocoded {
                    ticket_id: ticket.id(),
                    postcode,
                    coords,
                })
            }
            // Writes always report back, the dialog cannot close while one is in flight.
            ProviderCommand::Submit { ticket, submission } => {
                let result = self
                    .api
                    .post_form(submission.endpoint, &submission.params)
                    .map_err(|err| err.user_message());
                Some(Delta::Submitted {
                    ticket_id: ticket.id(),
                    label: submission.label,
                    refresh: submission.refresh,
                    result,
                })
            }
        }
    }

    /// The three leaderboards load in parallel and succeed or fail together.
    pub fn leaderboards(&self) -> ApiResult<Leaderboards> {
        let (goals, (assists, motm)) = rayon::join(
            || self.api.leaderboard(LeaderboardKind::Goals),
            || {
                rayon::join(
                    || self.api.leaderboard(LeaderboardKind::Assists),
                    || self.api.leaderboard(LeaderboardKind::ManOfTheMatch),
                )
            },
        );
        Ok(Leaderboards {
            goals: goals?,
            assists: assists?,
            motm: motm?,
        })
    }
}

pub fn spawn_provider<B: Backend>(
    provider: Provider<B>,
    parallelism: usize,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    let provider = Arc::new(provider);
    thread::spawn(move || {
        let pool = build_fetch_pool(parallelism);
        if pool.is_none() {
            let _ = tx.send(Delta::Log(
                "[WARN] Fetch pool unavailable, using plain threads".to_string(),
            ));
        }
        for cmd in cmd_rx {
            let provider = Arc::clone(&provider);
            let tx = tx.clone();
            let job = move || {
                if let Some(delta) = provider.execute(cmd) {
                    let _ = tx.send(delta);
                }
            };
            if let Some(pool) = pool.as_ref() {
                pool.spawn(job);
            } else {
                thread::spawn(job);
            }
        }
    });
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("fctracker-fetch-{idx}"))
        .build()
        .ok()
}

fn shown<T>(result: ApiResult<T>) -> Result<T, String> {
    result.map_err(|err| err.user_message())
}
