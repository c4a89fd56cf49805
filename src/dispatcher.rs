//! Routes a captured advertisement to the matching RuuviTag decoder.

use crate::advertisement::{AdParser, AdPayloadParser, AdStructure, RawAdvertisement};
use crate::decoder::{self, CanonicalInput, DecodeError};
use crate::measurement::SensorRecord;
use log::debug;

/// Ruuvi Innovations manufacturer ID.
pub const RUUVI_MANUFACTURER_ID: u16 = 0x0499;

/// Eddystone URL prefixes used by RuuviTags in URL mode.
pub const RUUVI_URL_PREFIXES: [&str; 2] = ["https://ruu.vi/#", "https://r/"];

/// Finds RuuviTag data in advertisements and decodes it.
#[derive(Debug, Default, Clone)]
pub struct Dispatcher<P = AdPayloadParser> {
    parser: P,
}

impl<P: AdParser> Dispatcher<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// Decode an advertisement, reporting why no record was produced.
    pub fn try_identify(&self, advertisement: &RawAdvertisement) -> Result<SensorRecord, DecodeError> {
        let structures = self.parser.parse(&advertisement.scan_data)?;
        let input = select_input(&structures, advertisement).ok_or(DecodeError::NoRuuviData)?;
        decoder::try_decode(&input)
    }

    /// Decode an advertisement into a record.
    ///
    /// Returns `None` when the payload cannot be parsed, carries no Ruuvi
    /// data, or uses a format without a decoder.
    pub fn identify(&self, advertisement: &RawAdvertisement) -> Option<SensorRecord> {
        self.try_identify(advertisement)
            .inspect_err(|err| decoder::log_failure(&advertisement.device_address, err))
            .ok()
    }
}

/// Pick the decoder input from the parsed structures.
///
/// Structures are visited in order and every match replaces the previous
/// candidate, so the last matching structure wins.
fn select_input<'a>(
    structures: &'a [AdStructure],
    advertisement: &'a RawAdvertisement,
) -> Option<CanonicalInput<'a>> {
    let id = advertisement.device_address.as_str();
    let rssi = advertisement.signal_strength;

    structures
        .iter()
        .fold(None, |candidate, structure| match structure {
            AdStructure::Url { url } if is_ruuvi_url(url) => {
                debug!("{id}: Ruuvi URL {url}");
                Some(CanonicalInput::from_url(id, url, rssi))
            }
            AdStructure::Manufacturer { company_id, .. } if *company_id == RUUVI_MANUFACTURER_ID => {
                Some(CanonicalInput::from_raw(id, &advertisement.scan_data, rssi))
            }
            AdStructure::Url { .. } | AdStructure::Manufacturer { .. } | AdStructure::Other { .. } => {
                candidate
            }
        })
}

fn is_ruuvi_url(url: &str) -> bool {
    RUUVI_URL_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

/// Decode an advertisement with the default AD structure parser.
pub fn identify(advertisement: &RawAdvertisement) -> Option<SensorRecord> {
    Dispatcher::new(AdPayloadParser).identify(advertisement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advertisement::ParseError;
    use crate::test_utils::{
        FORMAT_3, FORMAT_5_VALID, TEST_ADDRESS, eddystone_url_structure, manufacturer_structure,
        ruuvi_scan_data,
    };

    /// Returns a fixed structure list regardless of input.
    struct FixedParser(Result<Vec<AdStructure>, ParseError>);

    impl AdParser for FixedParser {
        fn parse(&self, _data: &[u8]) -> Result<Vec<AdStructure>, ParseError> {
            self.0.clone()
        }
    }

    fn url_structure(url: &str) -> AdStructure {
        AdStructure::Url {
            url: url.to_string(),
        }
    }

    fn ruuvi_manufacturer() -> AdStructure {
        AdStructure::Manufacturer {
            company_id: RUUVI_MANUFACTURER_ID,
            payload: FORMAT_3[..].to_vec(),
        }
    }

    #[test]
    fn test_identify_manufacturer_data() {
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, ruuvi_scan_data(&FORMAT_5_VALID), -60);

        let record = identify(&advertisement).unwrap();
        assert_eq!(record.id, TEST_ADDRESS);
        assert_eq!(record.url, None);
        assert_eq!(record.signal_strength, -60);
        assert_eq!(record.measurement.data_format, 5);
    }

    #[test]
    fn test_identify_version_byte_selects_decoder() {
        let mut scan_data = ruuvi_scan_data(&FORMAT_3);
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, scan_data.clone(), -60);
        assert!(identify(&advertisement).is_some());

        scan_data[decoder::PROTOCOL_OFFSET] = 4;
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, scan_data, -60);
        assert_eq!(identify(&advertisement), None);
    }

    #[test]
    fn test_identify_eddystone_url() {
        let scan_data = eddystone_url_structure(0x03, b"ruu.vi/#BEgYAMR8n");
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, scan_data, -75);

        let record = identify(&advertisement).unwrap();
        assert_eq!(record.url.as_deref(), Some("https://ruu.vi/#BEgYAMR8n"));
        assert_eq!(record.signal_strength, -75);
        assert_eq!(record.measurement.data_format, 4);
    }

    #[test]
    fn test_identify_short_url_prefix() {
        let dispatcher = Dispatcher::new(FixedParser(Ok(vec![url_structure(
            "https://r/#AjwYAMFc",
        )])));
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, vec![], 0);

        let record = dispatcher.identify(&advertisement).unwrap();
        assert_eq!(record.measurement.data_format, 2);
    }

    #[test]
    fn test_identify_ignores_other_urls() {
        let dispatcher = Dispatcher::new(FixedParser(Ok(vec![url_structure(
            "https://example.com/#BEgYAMR8n",
        )])));
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, vec![], 0);

        assert_eq!(
            dispatcher.try_identify(&advertisement),
            Err(DecodeError::NoRuuviData)
        );
    }

    #[test]
    fn test_identify_ignores_other_manufacturers() {
        let mut scan_data = vec![0x02, 0x01, 0x06];
        scan_data.extend(manufacturer_structure(0x004C, &FORMAT_3));
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, scan_data, 0);

        assert_eq!(identify(&advertisement), None);
    }

    #[test]
    fn test_last_match_wins() {
        let scan_data = ruuvi_scan_data(&FORMAT_3);
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, scan_data, -60);

        let url_then_raw = Dispatcher::new(FixedParser(Ok(vec![
            url_structure("https://ruu.vi/#BEgYAMR8n"),
            ruuvi_manufacturer(),
        ])));
        let record = url_then_raw.identify(&advertisement).unwrap();
        assert_eq!(record.url, None);
        assert_eq!(record.measurement.data_format, 3);

        let raw_then_url = Dispatcher::new(FixedParser(Ok(vec![
            ruuvi_manufacturer(),
            url_structure("https://ruu.vi/#BEgYAMR8n"),
        ])));
        let record = raw_then_url.identify(&advertisement).unwrap();
        assert_eq!(record.url.as_deref(), Some("https://ruu.vi/#BEgYAMR8n"));
        assert_eq!(record.measurement.data_format, 4);
    }

    #[test]
    fn test_non_matching_structure_keeps_candidate() {
        let dispatcher = Dispatcher::new(FixedParser(Ok(vec![
            url_structure("https://ruu.vi/#BEgYAMR8n"),
            AdStructure::Other { ad_type: 0x09 },
            url_structure("https://example.com/"),
        ])));
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, vec![], 0);

        let record = dispatcher.identify(&advertisement).unwrap();
        assert_eq!(record.measurement.data_format, 4);
    }

    #[test]
    fn test_identify_parse_failure() {
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, vec![0x02, 0x01, 0x06, 0x1B, 0xFF], 0);

        assert!(matches!(
            Dispatcher::<AdPayloadParser>::default().try_identify(&advertisement),
            Err(DecodeError::Parse(ParseError::Truncated { .. }))
        ));
        assert_eq!(identify(&advertisement), None);
    }

    #[test]
    fn test_identify_without_ruuvi_structures() {
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, vec![0x02, 0x01, 0x06], 0);
        assert_eq!(identify(&advertisement), None);

        let empty = RawAdvertisement::new(TEST_ADDRESS, vec![], 0);
        assert_eq!(identify(&empty), None);
    }

    #[test]
    fn test_identify_short_raw_data() {
        let dispatcher = Dispatcher::new(FixedParser(Ok(vec![ruuvi_manufacturer()])));
        let advertisement = RawAdvertisement::new(TEST_ADDRESS, vec![0x03; 7], 0);

        assert_eq!(
            dispatcher.try_identify(&advertisement),
            Err(DecodeError::MissingVersion(7))
        );
    }
}
