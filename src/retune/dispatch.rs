//! Retune Request Dispatch
//!
//! Routes a request to an immediate, timed retune or to the deferred queue,
//! and builds the response. Every failure ends up as a cleared success bit;
//! the host always gets an answer.

use super::queue::RetuneQueue;
use crate::config::PACKET_LEN;
use crate::error::RetuneError;
use crate::hal::{BandSelector, RfFrontend, Synthesizer, TimeTamer};
use crate::protocol::{ResponseFlags, RetuneRequest, RetuneResponse};
use crate::types::{LmsFreq, Module, RetuneTime};

/// Serve one decoded retune request
///
/// Immediate requests block on the hardware and report the elapsed ticks;
/// they never touch the queue. Timestamped requests are queued and report
/// only whether there was room.
pub fn dispatch<const N: usize, S, B, C>(
    queue: &mut RetuneQueue<N>,
    frontend: &mut RfFrontend<S, B, C>,
    request: &RetuneRequest,
) -> RetuneResponse
where
    S: Synthesizer,
    B: BandSelector,
    C: TimeTamer,
{
    let mut freq = request.freq();
    let mut response = RetuneResponse::failure();

    let result = match request.time() {
        RetuneTime::Now => retune_now(frontend, request.module, &mut freq, &mut response),
        RetuneTime::At(timestamp) => enqueue(queue, request.module, freq, timestamp),
    };

    response.vcocap_result = freq.vcocap_result;
    match result {
        Ok(()) => response.flags.insert(ResponseFlags::SUCCESS),
        Err(e) => warn!("retune request failed: {}", e),
    }

    response
}

/// Decode a request packet, dispatch it, and encode the response packet
///
/// A packet that fails to decode is answered with an unsuccessful response.
pub fn handle_packet<const N: usize, S, B, C>(
    queue: &mut RetuneQueue<N>,
    frontend: &mut RfFrontend<S, B, C>,
    request: &[u8; PACKET_LEN],
    response: &mut [u8; PACKET_LEN],
) -> RetuneResponse
where
    S: Synthesizer,
    B: BandSelector,
    C: TimeTamer,
{
    let resp = match RetuneRequest::unpack(request) {
        Ok(req) => dispatch(queue, frontend, &req),
        Err(e) => {
            warn!("undecodable retune packet: {}", e);
            RetuneResponse::failure()
        }
    };

    resp.pack(response);
    resp
}

fn retune_now<S, B, C>(
    frontend: &mut RfFrontend<S, B, C>,
    module: Option<Module>,
    freq: &mut LmsFreq,
    response: &mut RetuneResponse,
) -> Result<(), RetuneError>
where
    S: Synthesizer,
    B: BandSelector,
    C: TimeTamer,
{
    let module = module.ok_or(RetuneError::InvalidModule)?;

    let start = frontend.clock.timestamp(module);

    frontend
        .synth
        .set_precalculated_frequency(module, freq)
        .map_err(RetuneError::HardwareTune)?;
    response.flags.insert(ResponseFlags::DURATION_VALID);

    frontend
        .bands
        .band_select(module, freq.low_band())
        .map_err(RetuneError::HardwareBandSelect)?;

    let end = frontend.clock.timestamp(module);
    response.duration = end.wrapping_sub(start);
    trace!("retune {} took {} ticks", module, response.duration);

    Ok(())
}

fn enqueue<const N: usize>(
    queue: &mut RetuneQueue<N>,
    module: Option<Module>,
    freq: LmsFreq,
    timestamp: u64,
) -> Result<(), RetuneError> {
    let module = module.ok_or(RetuneError::InvalidModule)?;
    let pending = queue.insert(freq, module, timestamp)?;
    debug!("retune {} queued for {} ({} pending)", module, timestamp, pending);
    Ok(())
}
