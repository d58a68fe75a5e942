//! Programmable transaction builder.
//!
//! [`Transaction`] collects inputs and commands in a JSON-friendly form and
//! renders the BCS `TransactionData` both chains accept on `build`. The
//! type parameter keeps a transaction built for one chain from being
//! signed or submitted as the other's.

use std::fmt;
use std::marker::PhantomData;

use fastcrypto::encoding::{Base58, Encoding};
use fastcrypto::hash::{Blake2b256, HashFunction};
use move_core_types::account_address::AccountAddress;
use move_core_types::identifier::Identifier;
use move_core_types::language_storage::{StructTag as MoveStructTag, TypeTag as MoveTypeTag};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unimove_crypto::{CryptoResult, Keypair, SerializedSignature};
use unimove_types::address::{normalize_address, parse_address};
use unimove_types::encoding::{base64_decode, base64_encode};
use unimove_types::{parse_type_tag, StructTag, TypeTag};

use super::Chain;

/// Intent scope 0 (transaction data), version 0, app id 0.
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    MissingSender,
    MissingGasBudget,
    MissingGasPrice,
    InvalidAddress(String),
    InvalidTarget(String),
    InvalidType(String),
    InvalidDigest(String),
    InvalidArgument(String),
    Encode(String),
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::MissingSender => f.write_str("Transaction sender is not set"),
            TransactionError::MissingGasBudget => f.write_str("Transaction gas budget is not set"),
            TransactionError::MissingGasPrice => f.write_str("Transaction gas price is not set"),
            TransactionError::InvalidAddress(a) => write!(f, "Invalid address: {}", a),
            TransactionError::InvalidTarget(t) => {
                write!(f, "Invalid move call target '{}' (expected package::module::function)", t)
            }
            TransactionError::InvalidType(t) => write!(f, "Invalid type argument: {}", t),
            TransactionError::InvalidDigest(d) => write!(f, "Invalid object digest: {}", d),
            TransactionError::InvalidArgument(a) => write!(f, "Invalid argument: {}", a),
            TransactionError::Encode(e) => write!(f, "Failed to encode transaction: {}", e),
        }
    }
}

impl std::error::Error for TransactionError {}

/// Reference to an owned object at a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: String,
    pub version: u64,
    /// Base58 object digest.
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CallArg {
    /// BCS bytes, base64.
    Pure { bytes: String },
    ImmOrOwnedObject { object: ObjectRef },
    SharedObject {
        object_id: String,
        initial_shared_version: u64,
        mutable: bool,
    },
    Receiving { object: ObjectRef },
}

/// A value available to commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    MoveCall {
        package: String,
        module: String,
        function: String,
        type_arguments: Vec<String>,
        arguments: Vec<Argument>,
    },
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction<C> {
    sender: Option<String>,
    gas_budget: Option<u64>,
    gas_price: Option<u64>,
    #[serde(default)]
    gas_payment: Vec<ObjectRef>,
    #[serde(default)]
    inputs: Vec<CallArg>,
    #[serde(default)]
    commands: Vec<Command>,
    #[serde(skip)]
    _chain: PhantomData<fn() -> C>,
}

impl<C: Chain> fmt::Debug for Transaction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("chain", &C::ID)
            .field("sender", &self.sender)
            .field("inputs", &self.inputs.len())
            .field("commands", &self.commands)
            .finish()
    }
}

impl<C: Chain> Default for Transaction<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn checked_address(value: &str) -> Result<String, TransactionError> {
    parse_address(value)
        .map(|_| normalize_address(value))
        .ok_or_else(|| TransactionError::InvalidAddress(value.to_string()))
}

impl<C: Chain> Transaction<C> {
    pub fn new() -> Self {
        Self {
            sender: None,
            gas_budget: None,
            gas_price: None,
            gas_payment: Vec::new(),
            inputs: Vec::new(),
            commands: Vec::new(),
            _chain: PhantomData,
        }
    }

    pub fn from_json(value: Value) -> Result<Self, TransactionError> {
        serde_json::from_value(value).map_err(|e| TransactionError::InvalidArgument(e.to_string()))
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn set_sender(&mut self, sender: &str) -> Result<(), TransactionError> {
        self.sender = Some(checked_address(sender)?);
        Ok(())
    }

    /// Set the sender unless one is already present.
    pub fn set_sender_if_not_set(&mut self, sender: &str) -> Result<(), TransactionError> {
        if self.sender.is_none() {
            self.set_sender(sender)?;
        }
        Ok(())
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = Some(budget);
    }

    pub fn set_gas_price(&mut self, price: u64) {
        self.gas_price = Some(price);
    }

    pub fn set_gas_payment(&mut self, payment: Vec<ObjectRef>) {
        self.gas_payment = payment;
    }

    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    fn add_input(&mut self, arg: CallArg) -> Argument {
        self.inputs.push(arg);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    fn add_command(&mut self, command: Command) -> Argument {
        self.commands.push(command);
        Argument::Result((self.commands.len() - 1) as u16)
    }

    /// A pure input holding the BCS encoding of `value`.
    pub fn pure<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<Argument, TransactionError> {
        let bytes = bcs::to_bytes(value).map_err(|e| TransactionError::Encode(e.to_string()))?;
        Ok(self.add_input(CallArg::Pure {
            bytes: base64_encode(&bytes),
        }))
    }

    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.add_input(CallArg::Pure {
            bytes: base64_encode(&value.to_le_bytes()),
        })
    }

    pub fn pure_address(&mut self, address: &str) -> Result<Argument, TransactionError> {
        let parsed = parse_address(address)
            .ok_or_else(|| TransactionError::InvalidAddress(address.to_string()))?;
        Ok(self.add_input(CallArg::Pure {
            bytes: base64_encode(parsed.as_ref()),
        }))
    }

    pub fn object(&mut self, object: ObjectRef) -> Argument {
        self.add_input(CallArg::ImmOrOwnedObject { object })
    }

    pub fn shared_object(
        &mut self,
        object_id: &str,
        initial_shared_version: u64,
        mutable: bool,
    ) -> Result<Argument, TransactionError> {
        Ok(self.add_input(CallArg::SharedObject {
            object_id: checked_address(object_id)?,
            initial_shared_version,
            mutable,
        }))
    }

    /// `target` is `package::module::function`.
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: &[&str],
        arguments: Vec<Argument>,
    ) -> Result<Argument, TransactionError> {
        let parts: Vec<&str> = target.split("::").collect();
        let [package, module, function] = parts.as_slice() else {
            return Err(TransactionError::InvalidTarget(target.to_string()));
        };
        if !Identifier::is_valid(module) || !Identifier::is_valid(function) {
            return Err(TransactionError::InvalidTarget(target.to_string()));
        }
        let mut types = Vec::with_capacity(type_arguments.len());
        for ty in type_arguments {
            let parsed = parse_type_tag(ty).map_err(|e| TransactionError::InvalidType(e.to_string()))?;
            types.push(parsed.to_canonical_string());
        }
        Ok(self.add_command(Command::MoveCall {
            package: checked_address(package)?,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: types,
            arguments,
        }))
    }

    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Argument {
        self.add_command(Command::SplitCoins { coin, amounts })
    }

    pub fn merge_coins(&mut self, destination: Argument, sources: Vec<Argument>) -> Argument {
        self.add_command(Command::MergeCoins {
            destination,
            sources,
        })
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, address: Argument) -> Argument {
        self.add_command(Command::TransferObjects { objects, address })
    }

    /// BCS-encoded `TransactionData`.
    pub fn build(&self) -> Result<Vec<u8>, TransactionError> {
        let sender = self.sender.as_deref().ok_or(TransactionError::MissingSender)?;
        let sender = wire_address(sender)?;
        let budget = self.gas_budget.ok_or(TransactionError::MissingGasBudget)?;
        let price = self.gas_price.ok_or(TransactionError::MissingGasPrice)?;

        let inputs = self
            .inputs
            .iter()
            .map(wire::CallArg::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let commands = self
            .commands
            .iter()
            .map(wire::Command::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let payment = self
            .gas_payment
            .iter()
            .map(wire_object_ref)
            .collect::<Result<Vec<_>, _>>()?;

        let data = wire::TransactionData::V1(wire::TransactionDataV1 {
            kind: wire::TransactionKind::ProgrammableTransaction(wire::ProgrammableTransaction {
                inputs,
                commands,
            }),
            sender,
            gas_data: wire::GasData {
                payment,
                owner: sender,
                price,
                budget,
            },
            expiration: wire::TransactionExpiration::None,
        });
        bcs::to_bytes(&data).map_err(|e| TransactionError::Encode(e.to_string()))
    }
}

/// Digest signed for a transaction: `Blake2b256(intent || tx_bytes)`.
pub fn transaction_signing_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut input = Vec::with_capacity(TRANSACTION_INTENT.len() + tx_bytes.len());
    input.extend_from_slice(&TRANSACTION_INTENT);
    input.extend_from_slice(tx_bytes);
    Blake2b256::digest(&input).digest
}

/// A signed transaction ready for `executeTransactionBlock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Base64 transaction bytes.
    pub bytes: String,
    /// Serialized signature.
    pub signature: String,
}

pub fn sign_transaction_bytes(keypair: &Keypair, tx_bytes: &[u8]) -> SignedTransaction {
    let digest = transaction_signing_digest(tx_bytes);
    let signature = SerializedSignature {
        scheme: keypair.scheme(),
        signature: keypair.sign(&digest),
        public_key: keypair.public_key(),
    };
    SignedTransaction {
        bytes: base64_encode(tx_bytes),
        signature: signature.to_base64(),
    }
}

/// Decode base64 transaction bytes and sign them.
pub fn sign_transaction_base64(keypair: &Keypair, tx_b64: &str) -> CryptoResult<SignedTransaction> {
    let bytes = base64_decode(tx_b64, "transaction bytes")
        .map_err(|e| unimove_crypto::CryptoError::InvalidSignature(e.to_string()))?;
    Ok(sign_transaction_bytes(keypair, &bytes))
}

fn wire_address(value: &str) -> Result<AccountAddress, TransactionError> {
    parse_address(value).ok_or_else(|| TransactionError::InvalidAddress(value.to_string()))
}

fn wire_object_ref(object: &ObjectRef) -> Result<wire::ObjectRef, TransactionError> {
    let digest = Base58::decode(&object.digest)
        .map_err(|_| TransactionError::InvalidDigest(object.digest.clone()))?;
    if digest.len() != 32 {
        return Err(TransactionError::InvalidDigest(object.digest.clone()));
    }
    Ok((wire_address(&object.object_id)?, object.version, digest))
}

fn wire_identifier(value: &str) -> Result<Identifier, TransactionError> {
    Identifier::new(value).map_err(|_| TransactionError::InvalidTarget(value.to_string()))
}

fn wire_struct_tag(tag: &StructTag) -> Result<MoveStructTag, TransactionError> {
    Ok(MoveStructTag {
        address: wire_address(&tag.address)?,
        module: wire_identifier(&tag.module)?,
        name: wire_identifier(&tag.name)?,
        type_params: tag
            .type_params
            .iter()
            .map(wire_type_tag)
            .collect::<Result<_, _>>()?,
    })
}

fn wire_type_tag(tag: &TypeTag) -> Result<MoveTypeTag, TransactionError> {
    Ok(match tag {
        TypeTag::Bool => MoveTypeTag::Bool,
        TypeTag::U8 => MoveTypeTag::U8,
        TypeTag::U16 => MoveTypeTag::U16,
        TypeTag::U32 => MoveTypeTag::U32,
        TypeTag::U64 => MoveTypeTag::U64,
        TypeTag::U128 => MoveTypeTag::U128,
        TypeTag::U256 => MoveTypeTag::U256,
        TypeTag::Address => MoveTypeTag::Address,
        TypeTag::Signer => MoveTypeTag::Signer,
        TypeTag::Vector(inner) => MoveTypeTag::Vector(Box::new(wire_type_tag(inner)?)),
        TypeTag::Struct(s) => MoveTypeTag::Struct(Box::new(wire_struct_tag(s)?)),
    })
}

/// BCS layout of `TransactionData`; variant order is significant.
mod wire {
    use move_core_types::account_address::AccountAddress;
    use move_core_types::identifier::Identifier;
    use move_core_types::language_storage::TypeTag;
    use serde::Serialize;
    use unimove_types::encoding::base64_decode;
    use unimove_types::parse_type_tag;

    use super::{
        wire_address, wire_identifier, wire_object_ref, wire_type_tag, Argument, TransactionError,
    };

    pub type ObjectRef = (AccountAddress, u64, Vec<u8>);

    #[derive(Serialize)]
    pub enum TransactionData {
        V1(TransactionDataV1),
    }

    #[derive(Serialize)]
    pub struct TransactionDataV1 {
        pub kind: TransactionKind,
        pub sender: AccountAddress,
        pub gas_data: GasData,
        pub expiration: TransactionExpiration,
    }

    #[derive(Serialize)]
    pub enum TransactionKind {
        ProgrammableTransaction(ProgrammableTransaction),
    }

    #[derive(Serialize)]
    pub struct ProgrammableTransaction {
        pub inputs: Vec<CallArg>,
        pub commands: Vec<Command>,
    }

    #[derive(Serialize)]
    pub struct GasData {
        pub payment: Vec<ObjectRef>,
        pub owner: AccountAddress,
        pub price: u64,
        pub budget: u64,
    }

    #[derive(Serialize)]
    pub enum TransactionExpiration {
        None,
    }

    #[derive(Serialize)]
    pub enum CallArg {
        Pure(Vec<u8>),
        Object(ObjectArg),
    }

    #[derive(Serialize)]
    pub enum ObjectArg {
        ImmOrOwnedObject(ObjectRef),
        SharedObject {
            id: AccountAddress,
            initial_shared_version: u64,
            mutable: bool,
        },
        Receiving(ObjectRef),
    }

    #[derive(Serialize)]
    pub struct ProgrammableMoveCall {
        pub package: AccountAddress,
        pub module: Identifier,
        pub function: Identifier,
        pub type_arguments: Vec<TypeTag>,
        pub arguments: Vec<Argument>,
    }

    #[derive(Serialize)]
    pub enum Command {
        MoveCall(Box<ProgrammableMoveCall>),
        TransferObjects(Vec<Argument>, Argument),
        SplitCoins(Argument, Vec<Argument>),
        MergeCoins(Argument, Vec<Argument>),
    }

    impl TryFrom<&super::CallArg> for CallArg {
        type Error = TransactionError;

        fn try_from(arg: &super::CallArg) -> Result<Self, Self::Error> {
            Ok(match arg {
                super::CallArg::Pure { bytes } => CallArg::Pure(
                    base64_decode(bytes, "pure input")
                        .map_err(|e| TransactionError::InvalidArgument(e.to_string()))?,
                ),
                super::CallArg::ImmOrOwnedObject { object } => {
                    CallArg::Object(ObjectArg::ImmOrOwnedObject(wire_object_ref(object)?))
                }
                super::CallArg::SharedObject {
                    object_id,
                    initial_shared_version,
                    mutable,
                } => CallArg::Object(ObjectArg::SharedObject {
                    id: wire_address(object_id)?,
                    initial_shared_version: *initial_shared_version,
                    mutable: *mutable,
                }),
                super::CallArg::Receiving { object } => {
                    CallArg::Object(ObjectArg::Receiving(wire_object_ref(object)?))
                }
            })
        }
    }

    impl TryFrom<&super::Command> for Command {
        type Error = TransactionError;

        fn try_from(command: &super::Command) -> Result<Self, Self::Error> {
            Ok(match command {
                super::Command::MoveCall {
                    package,
                    module,
                    function,
                    type_arguments,
                    arguments,
                } => {
                    let mut types = Vec::with_capacity(type_arguments.len());
                    for ty in type_arguments {
                        let parsed = parse_type_tag(ty)
                            .map_err(|e| TransactionError::InvalidType(e.to_string()))?;
                        types.push(wire_type_tag(&parsed)?);
                    }
                    Command::MoveCall(Box::new(ProgrammableMoveCall {
                        package: wire_address(package)?,
                        module: wire_identifier(module)?,
                        function: wire_identifier(function)?,
                        type_arguments: types,
                        arguments: arguments.clone(),
                    }))
                }
                super::Command::TransferObjects { objects, address } => {
                    Command::TransferObjects(objects.clone(), *address)
                }
                super::Command::SplitCoins { coin, amounts } => {
                    Command::SplitCoins(*coin, amounts.clone())
                }
                super::Command::MergeCoins {
                    destination,
                    sources,
                } => Command::MergeCoins(*destination, sources.clone()),
            })
        }
    }
}
