use dir_squeeze_core::Error;
use lettre::Address;
use std::str::FromStr;

pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > 255 {
        return false;
    }
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    hostname.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

pub fn check_address(role: &str, address: &str) -> Result<(), Error> {
    Address::from_str(address).map(|_| ()).map_err(|err| {
        Error::Validation(format!(
            "{} address appears to be invalid: {} ({})",
            role, address, err
        ))
    })
}

pub fn check_hostname(hostname: &str) -> Result<(), Error> {
    if is_valid_hostname(hostname) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "SMTP host appears to be invalid: {}",
            hostname
        )))
    }
}
