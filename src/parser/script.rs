use crate::parser::address::AddressHash;
use crate::parser::hash::pubkey_hash;
use bitcoin::blockdata::opcodes::{all, All};
use bitcoin_hashes::hex::ToHex;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Output script templates that resolve to an address hash.
///
/// Only the three classic templates are recognised, by shape alone.
/// Nothing is executed.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScriptType {
    Pay2PublicKeyHash,
    Pay2PublicKey,
    Pay2CompressedPublicKey,
    NotRecognised,
}

/// One decoded element of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// literal bytes pushed by a length byte 1-75
    Push(Vec<u8>),
    CheckSig,
    Dup,
    Hash160,
    EqualVerify,
    /// any opcode outside the table above
    Unsupported(u8),
}

///
/// `ScriptInfo` holds the decoded tokens of a script, its template
/// and the address hash the template resolves to.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInfo {
    pub tokens: Vec<Token>,
    pub pattern: ScriptType,
    pub address: Option<AddressHash>,
}

impl ScriptInfo {
    /// space separated tokens, pushes in hex
    pub fn asm(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    }
}

///
/// Tokenize a script and match it against the known templates.
///
pub fn evaluate_script(script: &[u8]) -> ScriptInfo {
    let tokens = tokenize(script);
    match match_template(&tokens, script.len()) {
        Some((pattern, address)) => ScriptInfo {
            tokens,
            pattern,
            address: Some(address),
        },
        None => ScriptInfo {
            tokens,
            pattern: ScriptType::NotRecognised,
            address: None,
        },
    }
}

/// Address hash of an output script, if it has a known shape.
#[inline]
pub fn lookup_address_from_script(script: &[u8]) -> Option<AddressHash> {
    evaluate_script(script).address
}

///
/// A push that runs past the end of the script captures the bytes
/// that are left.
///
pub fn tokenize(script: &[u8]) -> Vec<Token> {
    let push_min = all::OP_PUSHBYTES_1.into_u8();
    let push_max = all::OP_PUSHBYTES_75.into_u8();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < script.len() {
        let byte = script[pos];
        pos += 1;
        if byte >= push_min && byte <= push_max {
            let end = usize::min(pos + byte as usize, script.len());
            tokens.push(Token::Push(script[pos..end].to_vec()));
            pos = end;
            continue;
        }
        let op = All::from(byte);
        let token = if op == all::OP_CHECKSIG {
            Token::CheckSig
        } else if op == all::OP_DUP {
            Token::Dup
        } else if op == all::OP_HASH160 {
            Token::Hash160
        } else if op == all::OP_EQUALVERIFY {
            Token::EqualVerify
        } else {
            Token::Unsupported(byte)
        };
        tokens.push(token);
    }
    tokens
}

fn match_template(tokens: &[Token], raw_len: usize) -> Option<(ScriptType, AddressHash)> {
    match tokens {
        [Token::Dup, Token::Hash160, Token::Push(hash), Token::EqualVerify, Token::CheckSig]
            if hash.len() == 20 && raw_len == 25 =>
        {
            Some((ScriptType::Pay2PublicKeyHash, AddressHash::from_slice(hash)?))
        }
        [Token::Push(pk), Token::CheckSig] if pk.len() == 65 && raw_len == 67 => Some((
            ScriptType::Pay2PublicKey,
            AddressHash::from_inner(pubkey_hash(pk)),
        )),
        [Token::Push(pk), Token::CheckSig] if pk.len() == 33 && raw_len == 35 => Some((
            ScriptType::Pay2CompressedPublicKey,
            AddressHash::from_inner(pubkey_hash(pk)),
        )),
        _ => None,
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Push(data) => write!(f, "{}", data.to_hex()),
            Token::CheckSig => write!(f, "OP_CHECKSIG"),
            Token::Dup => write!(f, "OP_DUP"),
            Token::Hash160 => write!(f, "OP_HASH160"),
            Token::EqualVerify => write!(f, "OP_EQUALVERIFY"),
            Token::Unsupported(op) => write!(f, "OP_UNSUPPORTED_0x{:02x}", op),
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ScriptType::Pay2PublicKeyHash => write!(f, "Pay2PublicKeyHash"),
            ScriptType::Pay2PublicKey => write!(f, "Pay2PublicKey"),
            ScriptType::Pay2CompressedPublicKey => write!(f, "Pay2CompressedPublicKey"),
            ScriptType::NotRecognised => write!(f, "NotRecognised"),
        }
    }
}
