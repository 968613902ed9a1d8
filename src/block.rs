// Block definition: fixed canonical layout; identity = SHA256(canonical bytes)
use sha2::{Digest, Sha256};

pub type Hash = [u8; 32];

/// Chain position of the genesis block.
pub const GENESIS_ID: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub payload: String,
    pub signature: String,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        payload: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Transaction {
            sender: sender.into(),
            receiver: receiver.into(),
            payload: payload.into(),
            signature: signature.into(),
        }
    }

    /// Layout: each field length-prefixed (u32 LE) in declaration order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for field in [&self.sender, &self.receiver, &self.payload, &self.signature] {
            put_str(&mut out, field);
        }
        out
    }

    pub fn hash(&self) -> Hash {
        sha256_bytes(&self.canonical_bytes())
    }
}

/// Immutable ledger block. The content hash is computed once at construction,
/// so two blocks with equal hashes carry equal contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: u64,
    creator_id: String,
    timestamp: u64,
    predecessor_hash: Option<Hash>,
    transactions: Vec<Transaction>,
    content_hash: Hash,
}

impl Block {
    pub fn new(
        id: u64,
        creator_id: impl Into<String>,
        timestamp: u64,
        predecessor_hash: Option<Hash>,
        transactions: Vec<Transaction>,
    ) -> Self {
        let mut block = Block {
            id,
            creator_id: creator_id.into(),
            timestamp,
            predecessor_hash,
            transactions,
            content_hash: [0u8; 32],
        };
        block.content_hash = sha256_bytes(&block.canonical_bytes());
        block
    }

    /// Genesis block: id 1, no predecessor, no transactions.
    pub fn genesis(creator_id: impl Into<String>, timestamp: u64) -> Self {
        Block::new(GENESIS_ID, creator_id, timestamp, None, Vec::new())
    }

    /// Child of `self` with the next id.
    pub fn child(
        &self,
        creator_id: impl Into<String>,
        timestamp: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        Block::new(
            self.id + 1,
            creator_id,
            timestamp,
            Some(self.content_hash),
            transactions,
        )
    }

    /// Canonical byte encoding (hash input).
    /// Layout: [id (8 LE)] [creator (4 LE len + bytes)] [timestamp (8 LE)]
    /// [has predecessor (1)] [predecessor (32)] [tx count (4 LE)] [tx hashes (32 each)].
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            8 + 4 + self.creator_id.len() + 8 + 1 + 32 + 4 + 32 * self.transactions.len(),
        );
        out.extend_from_slice(&self.id.to_le_bytes());
        put_str(&mut out, &self.creator_id);
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        match &self.predecessor_hash {
            Some(prev) => {
                out.push(1);
                out.extend_from_slice(prev);
            }
            None => {
                out.push(0);
                out.extend_from_slice(&[0u8; 32]);
            }
        }
        out.extend_from_slice(&(self.transactions.len() as u32).to_le_bytes());
        for tx in &self.transactions {
            out.extend_from_slice(&tx.hash());
        }
        out
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    /// Producer-supplied seconds since epoch; untrusted.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn predecessor_hash(&self) -> Option<&Hash> {
        self.predecessor_hash.as_ref()
    }

    pub fn content_hash(&self) -> &Hash {
        &self.content_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn is_genesis(&self) -> bool {
        self.id == GENESIS_ID
    }
}

pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// First eight hex digits, for log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}

pub(crate) fn sha256_bytes(data: &[u8]) -> Hash {
    let mut h = Sha256::new();
    h.update(data);
    h.finalize().into()
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// Hex serialization for hash fields.
#[cfg(feature = "export")]
pub(crate) mod serde_hash {
    use super::Hash;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(hash: &Hash, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(hash))
    }

    pub mod option {
        use super::Hash;
        use serde::Serializer;

        pub fn serialize<S: Serializer>(hash: &Option<Hash>, s: S) -> Result<S::Ok, S::Error> {
            match hash {
                Some(h) => s.serialize_some(&hex::encode(h)),
                None => s.serialize_none(),
            }
        }
    }
}
