//! Audio trigger seam. Decoding and mixing live behind the sink.

/// Volumes are percentages, 100 is unattenuated.
pub trait AudioSink {
    fn play(&mut self, locator: &str, volume: u32) -> anyhow::Result<()>;
    fn stop(&mut self);
    /// Preloads `count` voices of a short sample for [`AudioSink::play_from_pool`].
    fn load_pool(&mut self, locator: &str, count: usize) -> anyhow::Result<()>;
    fn play_from_pool(&mut self, volume: u32);
    fn release_pool(&mut self);
}

/// Drops every trigger.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _locator: &str, _volume: u32) -> anyhow::Result<()> {
        Ok(())
    }
    fn stop(&mut self) {}
    fn load_pool(&mut self, _locator: &str, _count: usize) -> anyhow::Result<()> {
        Ok(())
    }
    fn play_from_pool(&mut self, _volume: u32) {}
    fn release_pool(&mut self) {}
}

/// Writes every trigger to the log, for headless playback.
#[derive(Debug, Default)]
pub struct LogAudio {
    pool: Option<(String, usize)>,
}

impl AudioSink for LogAudio {
    fn play(&mut self, locator: &str, volume: u32) -> anyhow::Result<()> {
        log::info!("[audio] play {} volume:{}", locator, volume);
        Ok(())
    }

    fn stop(&mut self) {
        log::info!("[audio] stop");
    }

    fn load_pool(&mut self, locator: &str, count: usize) -> anyhow::Result<()> {
        log::debug!("[audio] pool {} x{}", locator, count);
        self.pool = Some((locator.to_string(), count));
        Ok(())
    }

    fn play_from_pool(&mut self, volume: u32) {
        if let Some((locator, _)) = &self.pool {
            log::trace!("[audio] letter {} volume:{}", locator, volume);
        }
    }

    fn release_pool(&mut self) {
        self.pool = None;
    }
}
