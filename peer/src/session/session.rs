use std::{
    mem,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use lockstep_shared::{
    dispatch_tick, ConnectionId, FrameIndex, Input, InputHandler, PlayoutDelayedClock, PeerId,
    Simulation, State, TickListener, TickSource, TimeClock, FIRST_FRAME_INDEX,
    NO_ACKNOWLEDGED_FRAME,
};

use crate::{
    error::SessionError,
    network::{
        events::{AcknowledgeFrameEvent, ErrorEvent, ReceiveFrameEvent, StateSynchronizedEvent},
        network::Network,
    },
    session::{
        events::SessionEvents, input_capture::InputCapture, input_provider::InputProvider,
        session_config::SessionConfig,
    },
    transport::Transport,
};

/// A lockstep session: one local peer wired to its network, simulation and
/// clocks.
///
/// Every tick runs four stages in order. Network traffic is received first,
/// then the simulation clock executes whatever frames are ready, then input
/// capture is paused or resumed depending on how far ahead of the
/// acknowledged frames it is, and finally the input clock captures local
/// input and flushes it to the peers.
pub struct Session<S: State, I: Input, P: InputProvider<S, I>> {
    config: SessionConfig,
    provider: P,
    network: Network<S, I>,
    simulation: Simulation<S, I>,
    simulation_clock: PlayoutDelayedClock<TimeClock>,
    input_clock: TimeClock,
    buffer_clock: TimeClock,
    is_host: bool,
    started: bool,
    input_halted: bool,
    max_captured_tick: FrameIndex,
    last_marked_acknowledgment: FrameIndex,
    last_update: Option<Instant>,
    incoming_events: SessionEvents<S>,
}

impl<S: State, I: Input, P: InputProvider<S, I>> Session<S, I, P> {
    pub fn new<H: InputHandler<S, I> + 'static>(
        config: SessionConfig,
        transport: Box<dyn Transport>,
        provider: P,
        input_handler: H,
    ) -> Self {
        let mut network_config = config.network.clone();
        network_config.remote_peer_count = usize::from(config.peer_count.saturating_sub(1));
        let network = Network::new(network_config, transport);

        let mut simulation = Simulation::new(config.frame_buffer);
        simulation.set_input_handler(input_handler);

        let simulation_clock = PlayoutDelayedClock::new(
            TimeClock::new(config.tick_rate),
            config.playout_delay,
            config.peer_count,
            config.frame_buffer,
        );
        let input_clock = TimeClock::new(config.tick_rate);
        let mut buffer_clock = TimeClock::new(config.tick_rate);
        buffer_clock.start();

        Self {
            config,
            provider,
            network,
            simulation,
            simulation_clock,
            input_clock,
            buffer_clock,
            is_host: false,
            started: false,
            input_halted: false,
            max_captured_tick: FrameIndex::MIN,
            last_marked_acknowledgment: NO_ACKNOWLEDGED_FRAME,
            last_update: None,
            incoming_events: SessionEvents::new(),
        }
    }

    /// Starts a new session from the provider's start state
    pub fn host(&mut self) {
        let state = self.provider.start_state();
        self.host_with_state(state);
    }

    /// Starts a new session from `state` at frame 0. The session begins once
    /// the other peers have received that state.
    pub fn host_with_state(&mut self, state: S) {
        info!("hosting session as peer {}", self.network.my_peer_id());
        self.network.set_latest_state(state.clone(), FIRST_FRAME_INDEX);
        self.simulation.set_start_state(state, FIRST_FRAME_INDEX);
        self.is_host = true;
    }

    /// Connects to another peer. Peers that connect to a host receive its
    /// state during the handshake.
    pub fn connect(&mut self, hostname: &str) -> Result<ConnectionId, SessionError> {
        Ok(self.network.add_peer(hostname)?)
    }

    /// Stops capturing local input for good. Frames already captured are
    /// still sent and executed.
    pub fn stop_input(&mut self) {
        info!("input stopped at frame {}", self.input_clock.elapsed_frame_count());
        self.input_halted = true;
        self.input_clock.stop();
    }

    /// Runs one tick using the wall-clock time since the previous update
    pub fn update(&mut self, now: Instant) -> Result<SessionEvents<S>, SessionError> {
        let elapsed = match self.last_update {
            Some(last_update) => now.saturating_duration_since(last_update),
            None => Duration::ZERO,
        };
        self.last_update = Some(now);
        self.tick(elapsed)
    }

    /// Lets `elapsed` time pass and returns what happened
    pub fn tick(&mut self, elapsed: Duration) -> Result<SessionEvents<S>, SessionError> {
        self.receive_network();
        self.advance_simulation(elapsed)?;
        self.advance_buffer(elapsed);
        self.advance_input(elapsed)?;
        Ok(mem::replace(&mut self.incoming_events, SessionEvents::new()))
    }

    // Accessors

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn my_peer_id(&self) -> PeerId {
        self.network.my_peer_id()
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// True once the state handshake finished and input capture began
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_input_running(&self) -> bool {
        self.input_clock.is_running()
    }

    pub fn frame_duration(&self) -> Duration {
        self.input_clock.frame_duration()
    }

    pub fn simulation(&self) -> &Simulation<S, I> {
        &self.simulation
    }

    pub fn simulation_clock(&self) -> &PlayoutDelayedClock<TimeClock> {
        &self.simulation_clock
    }

    pub fn network(&self) -> &Network<S, I> {
        &self.network
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    // Stages

    fn receive_network(&mut self) {
        let mut events = self.network.receive();

        for start_frame in events.read::<StateSynchronizedEvent>() {
            self.start(start_frame);
        }
        for (peer_id, frame) in events.read::<ReceiveFrameEvent>() {
            let frame_index = frame.frame_index();
            self.simulation.set_or_extend_frame(frame);
            self.simulation_clock.mark_peer_ready(frame_index, peer_id);
        }

        // our own input counts as ready once every peer holds it
        let my_peer_id = self.network.my_peer_id();
        for frame_index in events.read::<AcknowledgeFrameEvent>() {
            let first = self
                .last_marked_acknowledgment
                .saturating_add(1)
                .max(self.simulation_clock.elapsed_frame_count());
            for acknowledged in first..=frame_index {
                self.simulation_clock.mark_peer_ready(acknowledged, my_peer_id);
            }
            self.last_marked_acknowledgment = self.last_marked_acknowledgment.max(frame_index);
        }

        for error in events.read::<ErrorEvent>() {
            self.incoming_events.push_error(error);
        }
    }

    fn start(&mut self, start_frame: FrameIndex) {
        if !self.is_host {
            match self.network.latest_state() {
                Some(state) => self.simulation.set_start_state(state.clone(), start_frame),
                None => {
                    warn!("synchronized without a state, ignoring");
                    return;
                }
            }
        }

        let start_frame = self.simulation.start_frame();
        if self.simulation_clock.first_frame_index() != start_frame {
            self.simulation_clock.set_first_frame_index(start_frame);
        }
        self.input_clock.set_start_frame(start_frame);
        self.max_captured_tick = start_frame;
        self.started = true;
        if !self.input_halted {
            self.input_clock.start();
        }
        info!("session started at frame {}", start_frame);
        self.incoming_events.push_start(start_frame);
    }

    fn advance_simulation(&mut self, elapsed: Duration) -> Result<(), SessionError> {
        let ticks = self.simulation_clock.advance(elapsed);
        if ticks.is_empty() {
            return Ok(());
        }

        for tick in ticks {
            let mut listeners: [&mut dyn TickListener<SessionError>; 1] = [&mut self.simulation];
            dispatch_tick(tick, &mut listeners)?;
            if let Some(state) = self.simulation.state() {
                self.incoming_events.push_executed_frame(tick.saturating_sub(1), state.clone());
            }
        }

        // peers joining later start from the newest executed state
        if let Some(state) = self.simulation.state() {
            let snapshot = state.clone();
            self.network
                .set_latest_state(snapshot, self.simulation.elapsed_frame_count());
        }
        Ok(())
    }

    fn advance_buffer(&mut self, elapsed: Duration) {
        for _ in self.buffer_clock.advance(elapsed) {
            let input_frames = self.input_clock.elapsed_frame_count();
            let too_far_ahead = input_frames.saturating_sub(self.config.max_peer_delay)
                > self.network.latest_acknowledged_frame();
            let should_run = self.started && !self.input_halted && !too_far_ahead;

            if should_run != self.input_clock.is_running() {
                debug!(
                    "input {} at frame {}, latest acknowledged frame {}",
                    if should_run { "resumed" } else { "paused" },
                    input_frames,
                    self.network.latest_acknowledged_frame()
                );
                self.input_clock.set_running(should_run);
            }

            // keep retransmitting while capture is paused
            if self.started && !should_run {
                self.network.send_data(input_frames.saturating_sub(1));
            }
        }
    }

    fn advance_input(&mut self, elapsed: Duration) -> Result<(), SessionError> {
        for tick in self.input_clock.advance(elapsed) {
            let mut capture = InputCapture {
                provider: &mut self.provider,
                simulation: &mut self.simulation,
                network: &mut self.network,
                max_captured_tick: &mut self.max_captured_tick,
            };
            let mut listeners: [&mut dyn TickListener<SessionError>; 1] = [&mut capture];
            dispatch_tick(tick, &mut listeners)?;
        }
        Ok(())
    }
}
