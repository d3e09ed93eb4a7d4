use super::ModuleParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sim800;

impl ModuleParams for Sim800 {
    fn skip_gprs_attach(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "SIM800"
    }
}
