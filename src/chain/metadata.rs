//! Metadata-driven call encoding.
//!
//! Pallet and call indices are looked up by name in the runtime metadata, and
//! arguments are encoded by walking the `scale-info` type registry, so the same
//! code works across runtimes whose indices or address types differ.

use super::EncodedCall;
use anyhow::{anyhow, bail, Context, Result};
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed};
use parity_scale_codec::{Compact, Encode};
use scale_info::{form::PortableForm, PortableRegistry, Type, TypeDef, TypeDefPrimitive, Variant};
use sp_core::crypto::{AccountId32, Ss58Codec};

/// Call enum of one pallet, as found in the metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalletCalls {
    pub name: String,
    pub index: u8,
    pub call_ty: u32,
}

impl PalletCalls {
    pub fn new(name: impl Into<String>, index: u8, call_ty: u32) -> Self {
        Self {
            name: name.into(),
            index,
            call_ty,
        }
    }
}

/// Argument value handed to the encoder; its shape is checked against the
/// registry type of the call field it fills.
#[derive(Debug, Clone)]
pub enum CallArg {
    /// 20 or 32 raw account bytes.
    Account(Vec<u8>),
    Balance(u128),
    Option(Option<Box<CallArg>>),
    /// Field-less enum variant by name, e.g. a proxy type.
    Unit(String),
    Call(EncodedCall),
    Calls(Vec<EncodedCall>),
}

impl CallArg {
    fn kind(&self) -> &'static str {
        match self {
            CallArg::Account(_) => "an account",
            CallArg::Balance(_) => "a balance",
            CallArg::Option(_) => "an option",
            CallArg::Unit(_) => "an enum variant",
            CallArg::Call(_) => "a call",
            CallArg::Calls(_) => "a call list",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallEncoder {
    registry: PortableRegistry,
    pallets: Vec<PalletCalls>,
}

impl CallEncoder {
    pub fn from_parts(registry: PortableRegistry, pallets: Vec<PalletCalls>) -> Self {
        Self { registry, pallets }
    }

    /// Build an encoder from decoded runtime metadata (V14 or V15).
    pub fn from_metadata(metadata: RuntimeMetadataPrefixed) -> Result<Self> {
        let encoder = match metadata.1 {
            RuntimeMetadata::V14(m) => Self::from_parts(
                m.types,
                m.pallets
                    .into_iter()
                    .filter_map(|p| p.calls.map(|c| PalletCalls::new(p.name, p.index, c.ty.id)))
                    .collect(),
            ),
            RuntimeMetadata::V15(m) => Self::from_parts(
                m.types,
                m.pallets
                    .into_iter()
                    .filter_map(|p| p.calls.map(|c| PalletCalls::new(p.name, p.index, c.ty.id)))
                    .collect(),
            ),
            _ => bail!("Unsupported runtime metadata version, expected V14 or V15"),
        };
        tracing::debug!("Loaded call metadata for {} pallets", encoder.pallets.len());
        Ok(encoder)
    }

    pub fn pallets(&self) -> &[PalletCalls] {
        &self.pallets
    }

    /// `Balances.transfer_keep_alive(dest, value)`.
    pub fn transfer_keep_alive(&self, dest: &str, value: u128) -> Result<EncodedCall> {
        let dest = parse_account(dest)?;
        self.encode_call(
            "Balances",
            "transfer_keep_alive",
            &[("dest", CallArg::Account(dest)), ("value", CallArg::Balance(value))],
        )
    }

    /// `Proxy.proxy(real, force_proxy_type, call)`.
    pub fn proxy(
        &self,
        real: &str,
        force_proxy_type: Option<&str>,
        call: EncodedCall,
    ) -> Result<EncodedCall> {
        let real = parse_account(real)?;
        let force = force_proxy_type.map(|name| Box::new(CallArg::Unit(name.to_string())));
        self.encode_call(
            "Proxy",
            "proxy",
            &[
                ("real", CallArg::Account(real)),
                ("force_proxy_type", CallArg::Option(force)),
                ("call", CallArg::Call(call)),
            ],
        )
    }

    /// `Utility.batch_all(calls)`.
    pub fn batch_all(&self, calls: Vec<EncodedCall>) -> Result<EncodedCall> {
        self.encode_call("Utility", "batch_all", &[("calls", CallArg::Calls(calls))])
    }

    /// Encode `pallet.call` with named arguments, in the field order of the metadata.
    pub fn encode_call(
        &self,
        pallet: &str,
        call: &str,
        args: &[(&str, CallArg)],
    ) -> Result<EncodedCall> {
        let calls = self
            .pallets
            .iter()
            .find(|p| p.name == pallet)
            .ok_or_else(|| anyhow!("Pallet {} is not available on this chain", pallet))?;
        let ty = self.resolve(calls.call_ty)?;
        let TypeDef::Variant(def) = &ty.type_def else {
            bail!("Call type of pallet {} is not an enum", pallet);
        };
        let variant = find_variant(&def.variants, call)
            .ok_or_else(|| anyhow!("Call {}.{} is not available on this chain", pallet, call))?;

        let mut out = vec![calls.index, variant.index];
        for field in &variant.fields {
            let name = field
                .name
                .as_deref()
                .ok_or_else(|| anyhow!("Call {}.{} has unnamed fields", pallet, call))?;
            let arg = args
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, a)| a)
                .ok_or_else(|| anyhow!("Missing argument '{}' for {}.{}", name, pallet, call))?;
            self.encode_arg(field.ty.id, arg, &mut out)
                .with_context(|| format!("Invalid argument '{}' for {}.{}", name, pallet, call))?;
        }
        Ok(EncodedCall::new(out))
    }

    fn resolve(&self, id: u32) -> Result<&Type<PortableForm>> {
        self.registry
            .resolve(id)
            .ok_or_else(|| anyhow!("Type {} missing from the metadata registry", id))
    }

    fn encode_arg(&self, ty_id: u32, arg: &CallArg, out: &mut Vec<u8>) -> Result<()> {
        let ty = self.resolve(ty_id)?;
        match (&ty.type_def, arg) {
            (TypeDef::Variant(_), CallArg::Call(call)) => {
                out.extend_from_slice(call.as_bytes());
            }
            (TypeDef::Sequence(_), CallArg::Calls(calls)) => {
                Compact(calls.len() as u32).encode_to(out);
                for call in calls {
                    out.extend_from_slice(call.as_bytes());
                }
            }
            (TypeDef::Variant(def), CallArg::Account(bytes)) => {
                // MultiAddress
                let name = match bytes.len() {
                    32 => "Id",
                    20 => "Address20",
                    n => bail!("Unsupported account length of {} bytes", n),
                };
                let variant = find_variant(&def.variants, name)
                    .ok_or_else(|| anyhow!("Address type {} has no {} variant", type_name(ty), name))?;
                let field = variant
                    .fields
                    .first()
                    .ok_or_else(|| anyhow!("Address variant {} has no payload", name))?;
                out.push(variant.index);
                self.encode_arg(field.ty.id, arg, out)?;
            }
            (TypeDef::Array(array), CallArg::Account(bytes)) => {
                if array.len as usize != bytes.len() {
                    bail!(
                        "Expected a {}-byte account, got {} bytes",
                        array.len,
                        bytes.len()
                    );
                }
                out.extend_from_slice(bytes);
            }
            (TypeDef::Variant(def), CallArg::Option(value)) => match value {
                None => {
                    let none = find_variant(&def.variants, "None")
                        .ok_or_else(|| anyhow!("{} is not an Option", type_name(ty)))?;
                    out.push(none.index);
                }
                Some(inner) => {
                    let some = find_variant(&def.variants, "Some")
                        .ok_or_else(|| anyhow!("{} is not an Option", type_name(ty)))?;
                    let field = some
                        .fields
                        .first()
                        .ok_or_else(|| anyhow!("{} has an empty Some variant", type_name(ty)))?;
                    out.push(some.index);
                    self.encode_arg(field.ty.id, inner, out)?;
                }
            },
            (TypeDef::Variant(def), CallArg::Unit(name)) => {
                let variant = find_variant(&def.variants, name)
                    .ok_or_else(|| anyhow!("Unknown {} variant '{}'", type_name(ty), name))?;
                if !variant.fields.is_empty() {
                    bail!("Variant '{}' of {} carries data", name, type_name(ty));
                }
                out.push(variant.index);
            }
            (TypeDef::Compact(compact), CallArg::Balance(value)) => {
                match self.resolve(compact.type_param.id)?.type_def {
                    TypeDef::Primitive(TypeDefPrimitive::U128) => Compact(*value).encode_to(out),
                    TypeDef::Primitive(TypeDefPrimitive::U64) => {
                        Compact(u64::try_from(*value).context("Amount exceeds u64 balance")?)
                            .encode_to(out)
                    }
                    TypeDef::Primitive(TypeDefPrimitive::U32) => {
                        Compact(u32::try_from(*value).context("Amount exceeds u32 balance")?)
                            .encode_to(out)
                    }
                    _ => bail!("Unsupported compact balance type"),
                }
            }
            (TypeDef::Primitive(primitive), CallArg::Balance(value)) => match primitive {
                TypeDefPrimitive::U128 => value.encode_to(out),
                TypeDefPrimitive::U64 => u64::try_from(*value)
                    .context("Amount exceeds u64 balance")?
                    .encode_to(out),
                other => bail!("Unsupported balance type {:?}", other),
            },
            // Newtypes such as AccountId32([u8; 32])
            (TypeDef::Composite(composite), _) if composite.fields.len() == 1 => {
                self.encode_arg(composite.fields[0].ty.id, arg, out)?;
            }
            (TypeDef::Tuple(tuple), _) if tuple.fields.len() == 1 => {
                self.encode_arg(tuple.fields[0].id, arg, out)?;
            }
            _ => bail!("Cannot encode {} as {}", arg.kind(), type_name(ty)),
        }
        Ok(())
    }
}

fn find_variant<'a>(
    variants: &'a [Variant<PortableForm>],
    name: &str,
) -> Option<&'a Variant<PortableForm>> {
    variants.iter().find(|v| v.name == name)
}

fn type_name(ty: &Type<PortableForm>) -> String {
    if ty.path.segments.is_empty() {
        "anonymous type".to_string()
    } else {
        ty.path.segments.join("::")
    }
}

/// Decode an account given as SS58 (any network prefix) or `0x` hex of 20 or 32 bytes.
pub fn parse_account(input: &str) -> Result<Vec<u8>> {
    let input = input.trim();
    if let Some(stripped) = input.strip_prefix("0x") {
        let bytes = hex::decode(stripped).with_context(|| format!("Invalid hex address '{}'", input))?;
        return match bytes.len() {
            20 | 32 => Ok(bytes),
            n => Err(anyhow!("Invalid address '{}': expected 20 or 32 bytes, got {}", input, n)),
        };
    }
    let (account, _format) = AccountId32::from_ss58check_with_version(input)
        .map_err(|e| anyhow!("Invalid address '{}': {:?}", input, e))?;
    Ok(<[u8; 32]>::from(account).to_vec())
}
