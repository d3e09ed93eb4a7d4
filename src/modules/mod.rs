pub mod sim800;
pub mod sim900;

pub trait ModuleParams: Copy {
    /// Whether `AT+CGATT=1` should be left out of the connect sequence,
    /// because the module attaches on its own when the bearer comes up
    fn skip_gprs_attach(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "unknown"
    }
}

/// Product family, detected once from the `ATI` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Module {
    #[default]
    Unknown,
    Sim900(sim900::Sim900),
    Sim800(sim800::Sim800),
}

impl Module {
    /// Match the start of the `ATI` reply, e.g. `SIM800 R14.18`.
    pub fn from_product_info(info: &[u8]) -> Option<Self> {
        if info.starts_with(b"SIM900") {
            Some(Self::Sim900(sim900::Sim900))
        } else if info.starts_with(b"SIM800") {
            Some(Self::Sim800(sim800::Sim800))
        } else {
            warn!("Unrecognised product {}, keeping defaults", crate::fmt::Bytes(info));
            None
        }
    }
}

macro_rules! inner {
    ($self: ident, $fn: ident) => {
        match $self {
            Self::Sim900(inner) => inner.$fn(),
            Self::Sim800(inner) => inner.$fn(),
            Self::Unknown => Generic.$fn(),
        }
    };
}

impl ModuleParams for Module {
    fn skip_gprs_attach(&self) -> bool {
        inner!(self, skip_gprs_attach)
    }

    fn name(&self) -> &'static str {
        inner!(self, name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Generic;

impl ModuleParams for Generic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_from_ati() {
        assert_eq!(
            Module::from_product_info(b"SIM800 R14.18"),
            Some(Module::Sim800(sim800::Sim800))
        );
        assert_eq!(
            Module::from_product_info(b"SIM900 R11.0"),
            Some(Module::Sim900(sim900::Sim900))
        );
        assert_eq!(Module::from_product_info(b"SIM7600E"), None);
    }

    #[test]
    fn only_sim800_skips_attach() {
        assert!(Module::Sim800(sim800::Sim800).skip_gprs_attach());
        assert!(!Module::Sim900(sim900::Sim900).skip_gprs_attach());
        assert!(!Module::Unknown.skip_gprs_attach());
    }
}
