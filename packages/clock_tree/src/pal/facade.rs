//! Dispatch between the real and fake platform implementations.

use std::time::Duration;

#[cfg(test)]
use crate::pal::FakePlatform;
use crate::pal::real::REAL_PLATFORM;
use crate::pal::{Platform, RealPlatform};

/// Either the real platform or a fake platform injected by a test.
#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(&'static RealPlatform),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&REAL_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn fake(fake: FakePlatform) -> Self {
        Self::Fake(fake)
    }
}

impl Platform for PlatformFacade {
    fn timestamp(&self) -> Duration {
        match self {
            Self::Real(platform) => platform.timestamp(),
            #[cfg(test)]
            Self::Fake(platform) => platform.timestamp(),
        }
    }
}

#[cfg(test)]
impl From<FakePlatform> for PlatformFacade {
    fn from(platform: FakePlatform) -> Self {
        Self::Fake(platform)
    }
}
