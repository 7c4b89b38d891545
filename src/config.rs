/*
    parport

    Copyright 2025 the parport authors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the "Software"),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    config.rs

    Port construction options, deserializable from TOML.

    Base addresses may be given as integers (TOML hex literals included) or
    as "0x378"-style strings, since existing deployment configs carry them
    both ways.

*/

use serde::{Deserialize, Deserializer};

use crate::errors::{PortError, Result};

#[derive(Clone, Debug, Deserialize)]
pub struct PortConfig {
    /// Base address of the SPP data register.
    #[serde(deserialize_with = "port_address")]
    pub spp_base_address: u16,

    /// Base address of the ECP register block, required for ExtendedPort.
    #[serde(default, deserialize_with = "opt_port_address")]
    pub ecp_base_address: Option<u16>,

    /// Explicit bidirectionality override. When set, the constructor skips
    /// the hardware probe and trusts this value.
    #[serde(default)]
    pub bidirectional: Option<bool>,

    /// Whether construction resets the control register to the Centronics
    /// idle state.
    #[serde(default = "default_reset_control")]
    pub reset_control: bool,

    /// Strobe pulse width override, in microseconds.
    #[serde(default)]
    pub strobe_pulse_width_us: Option<u16>,
}

fn default_reset_control() -> bool {
    true
}

impl PortConfig {
    pub fn new(spp_base_address: u16) -> Self {
        Self {
            spp_base_address,
            ecp_base_address: None,
            bidirectional: None,
            reset_control: true,
            strobe_pulse_width_us: None,
        }
    }

    pub fn with_ecp_base(mut self, ecp_base_address: u16) -> Self {
        self.ecp_base_address = Some(ecp_base_address);
        self
    }

    pub fn with_bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = Some(bidirectional);
        self
    }

    pub fn with_reset_control(mut self, reset_control: bool) -> Self {
        self.reset_control = reset_control;
        self
    }

    pub fn with_strobe_pulse_width(mut self, us: u16) -> Self {
        self.strobe_pulse_width_us = Some(us);
        self
    }

    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|err| PortError::Configuration(format!("bad port config: {}", err)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Number(u16),
    Text(String),
}

fn parse_address(repr: AddressRepr) -> std::result::Result<u16, String> {
    match repr {
        AddressRepr::Number(n) => Ok(n),
        AddressRepr::Text(s) => {
            let trimmed = s.trim();
            let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
                Some(digits) => u16::from_str_radix(digits, 16),
                None => trimmed.parse::<u16>(),
            };
            parsed.map_err(|_| format!("bad port address '{}'", s))
        }
    }
}

fn port_address<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = AddressRepr::deserialize(deserializer)?;
    parse_address(repr).map_err(serde::de::Error::custom)
}

fn opt_port_address<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<AddressRepr>::deserialize(deserializer)?;
    repr.map(|r| parse_address(r).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PortConfig::new(0x378);
        assert_eq!(config.spp_base_address, 0x378);
        assert!(config.ecp_base_address.is_none());
        assert!(config.bidirectional.is_none());
        assert!(config.reset_control);
    }

    #[test]
    fn test_toml_hex_literal() {
        let config = PortConfig::from_toml(
            r#"
            spp_base_address = 0x378
            ecp_base_address = 0x778
            bidirectional = true
            "#,
        )
        .unwrap();
        assert_eq!(config.spp_base_address, 0x378);
        assert_eq!(config.ecp_base_address, Some(0x778));
        assert_eq!(config.bidirectional, Some(true));
        assert!(config.reset_control);
    }

    #[test]
    fn test_toml_hex_string() {
        let config = PortConfig::from_toml(
            r#"
            spp_base_address = "0x3BC"
            reset_control = false
            strobe_pulse_width_us = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.spp_base_address, 0x3BC);
        assert!(!config.reset_control);
        assert_eq!(config.strobe_pulse_width_us, Some(10));
    }

    #[test]
    fn test_bad_address_rejected() {
        assert!(PortConfig::from_toml(r#"spp_base_address = "0xZZZ""#).is_err());
        assert!(PortConfig::from_toml(r#"spp_base_address = 0x10000"#).is_err());
    }
}
