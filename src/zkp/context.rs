//! Bundles the collaborators every sub-argument's `prove`/`verify` needs
//! (§6): the group, the commitment key, the public key (hashed into
//! several transcripts for domain separation even where it plays no
//! algebraic role), and the hash service. Grounded on the teacher's
//! habit of passing a small collaborator bundle into proof functions
//! (`src/zkp/shuffle.rs`'s `ShuffleInstance` plays a similar role).

use crate::commitment_key::CommitmentKey;
use crate::elgamal::PublicKey;
use crate::group::Group;
use crate::hashing::HashService;

pub struct ArgumentContext<'a, G: Group> {
    pub group: &'a G,
    pub pk: &'a PublicKey<G>,
    pub ck: &'a CommitmentKey<G>,
    pub hash_service: &'a HashService,
}

impl<'a, G: Group> Clone for ArgumentContext<'a, G> {
    fn clone(&self) -> Self {
        ArgumentContext {
            group: self.group,
            pk: self.pk,
            ck: self.ck,
            hash_service: self.hash_service,
        }
    }
}

impl<'a, G: Group> Copy for ArgumentContext<'a, G> {}
