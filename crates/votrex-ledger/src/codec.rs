//! Boundary codec for the contract's positional tuples
//!
//! `organizationData` and `getUserInfo` return fixed-position tuples. They are
//! decoded here exactly once; nothing above this module indexes by position.
//! Positions the core does not interpret are kept as opaque fields.

use crate::error::{RemoteError, Result};
use crate::gateway::{GET_USER_INFO, ORGANIZATION_DATA};
use serde_json::Value;
use votrex_types::{OpaqueFields, OrganizationRecord, UserInfo, WalletAddress};

pub const ORG_ADMIN_POSITION: usize = 1;
pub const ORG_MEMBER_COUNT_POSITION: usize = 3;
pub const ORG_EXISTS_POSITION: usize = 5;
const ORG_MIN_LEN: usize = 6;

pub const USER_IS_ADMIN_POSITION: usize = 1;
const USER_MIN_LEN: usize = 2;

/// Decode an `organizationData` tuple.
pub fn decode_organization(tuple: &[Value]) -> Result<OrganizationRecord> {
    require_len(ORGANIZATION_DATA, tuple, ORG_MIN_LEN)?;

    let admin = as_address(ORGANIZATION_DATA, ORG_ADMIN_POSITION, &tuple[ORG_ADMIN_POSITION])?;
    let member_count = as_count(
        ORGANIZATION_DATA,
        ORG_MEMBER_COUNT_POSITION,
        &tuple[ORG_MEMBER_COUNT_POSITION],
    )?;
    let exists = as_flag(ORGANIZATION_DATA, ORG_EXISTS_POSITION, &tuple[ORG_EXISTS_POSITION])?;

    Ok(OrganizationRecord {
        admin,
        member_count,
        exists,
        extra: opaque(
            tuple,
            &[
                ORG_ADMIN_POSITION,
                ORG_MEMBER_COUNT_POSITION,
                ORG_EXISTS_POSITION,
            ],
        ),
    })
}

/// Decode a `getUserInfo` tuple.
pub fn decode_user_info(tuple: &[Value]) -> Result<UserInfo> {
    require_len(GET_USER_INFO, tuple, USER_MIN_LEN)?;

    Ok(UserInfo {
        is_admin: as_flag(GET_USER_INFO, USER_IS_ADMIN_POSITION, &tuple[USER_IS_ADMIN_POSITION])?,
        extra: opaque(tuple, &[USER_IS_ADMIN_POSITION]),
    })
}

fn require_len(function: &str, tuple: &[Value], min: usize) -> Result<()> {
    if tuple.len() < min {
        return Err(RemoteError::decode(
            function,
            format!("expected at least {} fields, got {}", min, tuple.len()),
        ));
    }
    Ok(())
}

fn as_address(function: &str, position: usize, value: &Value) -> Result<WalletAddress> {
    value
        .as_str()
        .map(WalletAddress::new)
        .ok_or_else(|| RemoteError::decode(function, format!("field {} is not an address", position)))
}

fn as_flag(function: &str, position: usize, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| RemoteError::decode(function, format!("field {} is not a bool", position)))
}

/// Counts arrive as JSON numbers or, for uint256, as decimal strings.
fn as_count(function: &str, position: usize, value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| RemoteError::decode(function, format!("field {} is not a count", position)))
}

fn opaque(tuple: &[Value], consumed: &[usize]) -> OpaqueFields {
    tuple
        .iter()
        .enumerate()
        .filter(|(position, _)| !consumed.contains(position))
        .map(|(position, value)| (position, value.clone()))
        .collect()
}
