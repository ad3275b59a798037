//! Integration tests for the CAT transport
//!
//! These tests drive a `CatTransport` over in-memory pipes against:
//! - A scripted peer that checks each frame and answers with fixed bytes
//! - The virtual radio, for full command/reply round trips
//! - Fault injection (silent radio, truncated replies) and recovery

use std::time::{Duration, Instant};

use ft857_protocol::{
    Command, Frame, Mode, ParseError, RepeaterShift, SMeter, SquelchMode, ToneKind, TxState, Vfo,
};
use ft857_sim::{run_virtual_radio_task, RadioState, VirtualRadio, VirtualRadioCommand};
use ft857_transport::{identify, CatError, CatTransport, LinkConfig};
use proptest::prelude::*;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub const TIMEOUT_MS: u64 = 150;

    pub fn test_config() -> LinkConfig {
        LinkConfig {
            reply_timeout_ms: TIMEOUT_MS,
            drain_window_ms: 20,
            ..Default::default()
        }
    }

    /// A peer that expects one frame and answers with `reply`
    pub fn scripted(
        expected: Frame,
        reply: Vec<u8>,
    ) -> (CatTransport<DuplexStream>, JoinHandle<()>) {
        let (ours, mut theirs) = duplex(64);
        let handle = tokio::spawn(async move {
            let mut frame = [0u8; 5];
            theirs.read_exact(&mut frame).await.unwrap();
            assert_eq!(frame, expected);
            theirs.write_all(&reply).await.unwrap();
            // Hold the pipe open until the transport is done with it
            let mut rest = Vec::new();
            let _ = theirs.read_to_end(&mut rest).await;
        });
        (CatTransport::new("scripted", ours, test_config()), handle)
    }

    pub struct SimLink {
        pub cat: CatTransport<DuplexStream>,
        pub control: mpsc::Sender<VirtualRadioCommand>,
        pub states: broadcast::Receiver<RadioState>,
    }

    /// Serve a fresh virtual radio over a duplex pipe
    pub fn sim_link() -> SimLink {
        sim_link_with(VirtualRadio::new("sim"))
    }

    pub fn sim_link_with(radio: VirtualRadio) -> SimLink {
        let (ours, theirs) = duplex(256);
        let (control, cmd_rx) = mpsc::channel(8);
        let (state_tx, states) = broadcast::channel(64);
        tokio::spawn(run_virtual_radio_task(theirs, radio, cmd_rx, state_tx));
        SimLink {
            cat: CatTransport::new("sim", ours, test_config()),
            control,
            states,
        }
    }

    /// Most recent state broadcast so far
    pub fn latest(states: &mut broadcast::Receiver<RadioState>) -> Option<RadioState> {
        let mut last = None;
        while let Ok(state) = states.try_recv() {
            last = Some(state);
        }
        last
    }
}

use helpers::*;

// ============================================================================
// Scripted Replies
// ============================================================================

mod scripted_replies {
    use super::*;

    #[tokio::test]
    async fn test_set_mode_usb_frame() {
        let (mut cat, peer) = scripted([0x01, 0x00, 0x00, 0x00, 0x07], vec![0x00]);
        cat.set_mode(Mode::Usb).await.unwrap();
        drop(cat);
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_set_mode_lsb_frame() {
        let (mut cat, peer) = scripted([0x00, 0x00, 0x00, 0x00, 0x07], vec![0x00]);
        cat.set_mode(Mode::Lsb).await.unwrap();
        drop(cat);
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_get_frequency_and_mode() {
        let (mut cat, peer) = scripted(
            [0x00, 0x00, 0x00, 0x00, 0x03],
            vec![0x01, 0x40, 0x70, 0x00, 0x01],
        );
        let status = cat.get_frequency_and_mode().await.unwrap();
        assert_eq!(status.hz, 14_070_000);
        assert_eq!(status.mode, Some(Mode::Usb));
        drop(cat);
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_mode_byte_is_reported() {
        let (mut cat, _peer) = scripted(
            [0x00, 0x00, 0x00, 0x00, 0x03],
            vec![0x00, 0x70, 0x74, 0x00, 0x55],
        );
        let status = cat.get_frequency_and_mode().await.unwrap();
        assert_eq!(status.mode, None);
        assert_eq!(status.mode_code, 0x55);
        assert_eq!(status.mode_name(), "UNKNOWN");
    }

    #[tokio::test]
    async fn test_check_tx_idle() {
        let (mut cat, _peer) = scripted([0x00, 0x00, 0x00, 0x00, 0xF7], vec![0xFF]);
        assert_eq!(cat.check_tx().await.unwrap(), TxState::Receiving);
    }

    #[tokio::test]
    async fn test_check_tx_any_other_byte_transmits() {
        for status in [0x00u8, 0x01, 0x80, 0xFE] {
            let (mut cat, _peer) = scripted([0x00, 0x00, 0x00, 0x00, 0xF7], vec![status]);
            assert_eq!(cat.check_tx().await.unwrap(), TxState::Transmitting);
        }
    }

    #[tokio::test]
    async fn test_s_meter_readings() {
        let (mut cat, _peer) = scripted([0x00, 0x00, 0x00, 0x00, 0xE7], vec![0x0C]);
        let reading = cat.get_s_meter().await.unwrap();
        assert_eq!(reading, SMeter::OverS9(30));
        assert_eq!(reading.to_string(), "S9+30");

        let (mut cat, _peer) = scripted([0x00, 0x00, 0x00, 0x00, 0xE7], vec![0x05]);
        assert_eq!(cat.get_s_meter().await.unwrap().to_string(), "S5");
    }

    #[tokio::test]
    async fn test_get_vfo() {
        let (mut cat, _peer) = scripted([0x00, 0x68, 0x00, 0x00, 0xBB], vec![0x80, 0x00]);
        assert_eq!(cat.get_vfo().await.unwrap(), Vfo::A);

        let (mut cat, _peer) = scripted([0x00, 0x68, 0x00, 0x00, 0xBB], vec![0x81, 0x00]);
        assert_eq!(cat.get_vfo().await.unwrap(), Vfo::B);
    }

    #[tokio::test]
    async fn test_squelch_tone_pair_frame() {
        let (mut cat, _peer) = scripted([0x08, 0x85, 0x10, 0x00, 0x0B], vec![0x00]);
        cat.set_squelch_tone_pair(ToneKind::Ctcss, 885, 1000)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dcs_code_frame() {
        let (mut cat, _peer) = scripted([0x00, 0x23, 0x00, 0x23, 0x0C], vec![0x00]);
        cat.set_squelch_tone(ToneKind::Dcs, 23).await.unwrap();
    }

    #[tokio::test]
    async fn test_repeater_offset_frame() {
        let (mut cat, _peer) = scripted([0x00, 0x06, 0x00, 0x00, 0xF9], vec![0x00]);
        cat.set_repeater_offset(600).await.unwrap();
    }
}

// ============================================================================
// Timeouts and Partial Replies
// ============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_silent_peer_times_out_within_bound() {
        let (ours, _theirs) = duplex(64);
        let mut cat = CatTransport::new("silent", ours, test_config());

        let start = Instant::now();
        let err = cat.get_frequency_and_mode().await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, CatError::Timeout { timeout_ms: TIMEOUT_MS }));
        assert!(elapsed >= Duration::from_millis(TIMEOUT_MS));
        assert!(elapsed < Duration::from_millis(TIMEOUT_MS + 1000));
    }

    #[tokio::test]
    async fn test_partial_reply_is_short_reply() {
        let (mut cat, _peer) = scripted([0x00, 0x00, 0x00, 0x00, 0x03], vec![0x01, 0x40, 0x70]);
        let err = cat.get_frequency_and_mode().await.unwrap_err();
        assert!(matches!(
            err,
            CatError::ShortReply {
                expected: 5,
                received: 3
            }
        ));
        assert!(err.may_desync());
    }

    #[tokio::test]
    async fn test_closed_peer_is_disconnected() {
        let (ours, theirs) = duplex(64);
        drop(theirs);
        let mut cat = CatTransport::new("closed", ours, test_config());
        let err = cat.get_frequency().await.unwrap_err();
        // The write or the read notices first, depending on scheduling
        assert!(matches!(err, CatError::Disconnected | CatError::Io(_)));
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let err = "XYZ".parse::<Mode>().unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnrecognizedParameter { kind: "mode", .. }
        ));
        assert!("?".parse::<RepeaterShift>().is_err());
        assert!("TONE".parse::<SquelchMode>().is_err());
        assert!("X".parse::<ToneKind>().is_err());
    }
}

// ============================================================================
// Virtual Radio Round Trips
// ============================================================================

mod virtual_radio {
    use super::*;

    #[tokio::test]
    async fn test_set_and_read_back() {
        let mut link = sim_link();
        link.cat.set_frequency(7_074_000).await.unwrap();
        link.cat.set_mode(Mode::Dig).await.unwrap();

        let status = link.cat.get_frequency_and_mode().await.unwrap();
        assert_eq!(status.hz, 7_074_000);
        assert_eq!(status.mode, Some(Mode::Dig));
        assert_eq!(link.cat.get_frequency().await.unwrap(), 7_074_000);
        assert_eq!(link.cat.get_mode().await.unwrap(), Some(Mode::Dig));
    }

    #[tokio::test]
    async fn test_vfo_and_split() {
        let mut link = sim_link();
        assert_eq!(link.cat.get_vfo().await.unwrap(), Vfo::A);
        link.cat.switch_vfo().await.unwrap();
        assert_eq!(link.cat.get_vfo().await.unwrap(), Vfo::B);

        assert!(!link.cat.get_split_status().await.unwrap());
        link.cat.split(true).await.unwrap();
        assert!(link.cat.get_split_status().await.unwrap());
    }

    #[tokio::test]
    async fn test_ptt_and_tx_status() {
        let mut link = sim_link();
        assert_eq!(link.cat.check_tx().await.unwrap(), TxState::Receiving);
        link.cat.ptt(true).await.unwrap();
        assert_eq!(link.cat.check_tx().await.unwrap(), TxState::Transmitting);
        assert!(link.cat.read_tx_status().await.unwrap().ptt);
        link.cat.ptt(false).await.unwrap();
        assert_eq!(link.cat.check_tx().await.unwrap(), TxState::Receiving);
    }

    #[tokio::test]
    async fn test_signal_level_reaches_s_meter() {
        let mut link = sim_link();
        link.control
            .send(VirtualRadioCommand::SetSignal(5))
            .await
            .unwrap();
        // The control channel and the pipe are independent; wait for the
        // state broadcast before reading
        loop {
            let state = link.states.recv().await.unwrap();
            if state.signal == 5 {
                break;
            }
        }
        assert_eq!(link.cat.get_s_meter().await.unwrap(), SMeter::S(5));
        assert!(!link.cat.read_rx_status().await.unwrap().squelch_closed);
    }

    #[tokio::test]
    async fn test_settings_reach_radio_state() {
        let mut link = sim_link();
        link.cat.set_repeater_shift(RepeaterShift::Minus).await.unwrap();
        link.cat.set_repeater_offset(600).await.unwrap();
        link.cat.set_squelch_mode(SquelchMode::Ctcss).await.unwrap();
        link.cat
            .set_squelch_tone_pair(ToneKind::Ctcss, 885, 1000)
            .await
            .unwrap();
        link.cat.clarifier(true).await.unwrap();
        link.cat.set_clarifier_offset(-1230).await.unwrap();
        // One more exchange so every change has been broadcast
        link.cat.get_frequency().await.unwrap();

        let state = latest(&mut link.states).unwrap();
        assert_eq!(state.repeater_shift, RepeaterShift::Minus);
        assert_eq!(state.repeater_offset_khz, 600);
        assert_eq!(state.squelch_mode, SquelchMode::Ctcss);
        assert_eq!(state.ctcss_tones, (885, 1000));
        assert!(state.clarifier);
        assert_eq!(state.clarifier_offset_hz, -1230);
    }

    #[tokio::test]
    async fn test_locked_radio_ignores_sets() {
        let mut link = sim_link();
        link.cat.lock(true).await.unwrap();
        link.cat.set_frequency(3_573_000).await.unwrap();
        assert_eq!(link.cat.get_frequency().await.unwrap(), 14_070_000);
        link.cat.lock(false).await.unwrap();
        link.cat.set_frequency(3_573_000).await.unwrap();
        assert_eq!(link.cat.get_frequency().await.unwrap(), 3_573_000);
    }

    #[tokio::test]
    async fn test_eeprom_config_reads() {
        let mut radio = VirtualRadio::new("sim");
        radio.state_mut().agc_dsp.bandpass_filter = true;
        radio.state_mut().cw_meter.break_in = true;
        let mut link = sim_link_with(radio);

        let dsp = link.cat.get_agc_dsp_config().await.unwrap();
        assert!(dsp.agc);
        assert!(dsp.bandpass_filter);
        assert!(!dsp.notch_filter);

        let cw = link.cat.get_cw_meter_config().await.unwrap();
        assert!(cw.break_in);
        assert!(!cw.keyer);
    }

    #[tokio::test]
    async fn test_identify_finds_radio() {
        let mut link = sim_link();
        let status = identify(&mut link.cat).await.unwrap();
        assert_eq!(status.hz, 14_070_000);
        assert_eq!(status.mode, Some(Mode::Usb));
    }

    #[tokio::test]
    async fn test_silenced_radio_times_out() {
        let mut link = sim_link();
        link.control
            .send(VirtualRadioCommand::Silence(true))
            .await
            .unwrap();
        // Give the task a turn to apply it
        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = link.cat.get_frequency().await.unwrap_err();
        assert!(matches!(err, CatError::Timeout { .. }));
        assert!(identify(&mut link.cat).await.is_none());
    }

    #[tokio::test]
    async fn test_truncated_reply_then_recover() {
        let mut link = sim_link();
        link.control
            .send(VirtualRadioCommand::SetReplyLimit(Some(2)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = link.cat.get_frequency_and_mode().await.unwrap_err();
        assert!(matches!(
            err,
            CatError::ShortReply {
                expected: 5,
                received: 2
            }
        ));

        link.control
            .send(VirtualRadioCommand::SetReplyLimit(None))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        link.cat.drain_input().await.unwrap();
        assert_eq!(link.cat.get_frequency().await.unwrap(), 14_070_000);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_frequency_round_trip_through_sim(tens in 0u64..100_000_000) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let hz = tens * 10;
        let read_back = runtime.block_on(async {
            let mut link = sim_link();
            link.cat.set_frequency(hz).await.unwrap();
            link.cat.get_frequency().await.unwrap()
        });
        prop_assert_eq!(read_back, hz);
    }

    #[test]
    fn prop_frames_parse_back(hz in 0u64..1_000_000_000, mode_index in 0usize..10) {
        let mode = Mode::ALL[mode_index];
        for command in [
            Command::SetFrequency { hz: hz / 10 * 10 },
            Command::SetMode { mode },
        ] {
            prop_assert_eq!(Command::parse(&command.encode()).unwrap(), command);
        }
    }
}
