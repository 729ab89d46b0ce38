// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Reading and writing network weights as JSON

use std::fs::File;
use std::io;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::{NetError, Result};
use crate::network::Network;
use crate::prjn::Projection;

impl Projection {
    /// weights of this projection as a JSON value: the netinput scaling
    /// factor, then per receiving unit the sending unit indices and weights
    pub fn wts_to_json(&self) -> Value {
        let mut rows = Map::new();
        for ri in 0..self.recv_con.n.len() {
            let nc = self.recv_con.n[ri];
            let mut si = Vec::with_capacity(nc as usize);
            let mut wt = Vec::with_capacity(nc as usize);
            for rci in self.recv_con.range(ri) {
                si.push(self.recv_con.idx[rci]);
                wt.push(self.syns[self.r_syn_idx[rci] as usize].wt);
            }
            rows.insert(ri.to_string(), json!({ "n": nc, "Si": si, "Wt": wt }));
        }
        let mut obj = Map::new();
        obj.insert("GeScale".to_string(), json!(self.g_scale));
        obj.insert(self.send_nm.clone(), Value::Object(rows));
        Value::Object(obj)
    }

    /// apply weights from a projection JSON value, re-deriving the linear
    /// weights from the set values
    pub fn wts_from_json(&mut self, rows: &Map<String, Value>) -> Result<()> {
        for (rstr, entry) in rows.iter() {
            let ri: usize = rstr
                .parse()
                .map_err(|_| NetError::WtsFormat(format!("bad receiving unit index {rstr:?}")))?;
            let si = entry
                .get("Si")
                .and_then(Value::as_array)
                .ok_or_else(|| NetError::WtsFormat("missing Si array".to_string()))?;
            let wt = entry
                .get("Wt")
                .and_then(Value::as_array)
                .ok_or_else(|| NetError::WtsFormat("missing Wt array".to_string()))?;
            for (sv, wv) in si.iter().zip(wt.iter()) {
                let (Some(sidx), Some(w)) = (sv.as_u64(), wv.as_f64()) else {
                    return Err(NetError::WtsFormat(
                        "Si and Wt entries must be numbers".to_string(),
                    ));
                };
                self.set_syn_val("Wt", sidx as usize, ri, w as f32)?;
            }
        }
        Ok(())
    }
}

impl Network {
    /// all network weights as a JSON value: the network name mapping to a
    /// list of layers, each mapping its name to the projections it receives
    pub fn wts_to_json(&self) -> Value {
        let mut lays = Vec::with_capacity(self.layers.len());
        for lay in self.layers.iter() {
            let mut pvals = Vec::with_capacity(lay.recv_prjns.len());
            for &pi in lay.recv_prjns.iter() {
                pvals.push(self.prjns[pi].wts_to_json());
            }
            let mut lmap = Map::new();
            lmap.insert(lay.name.clone(), Value::Array(pvals));
            lays.push(Value::Object(lmap));
        }
        let mut nmap = Map::new();
        nmap.insert(self.name.clone(), Value::Array(lays));
        Value::Object(nmap)
    }

    /// write all network weights as JSON
    pub fn write_wts_json<W: io::Write>(&self, w: W) -> Result<()> {
        serde_json::to_writer_pretty(w, &self.wts_to_json())?;
        Ok(())
    }

    /// save all network weights to a JSON file
    pub fn save_wts_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let f = File::create(path)?;
        self.write_wts_json(io::BufWriter::new(f))
    }

    /// load network weights from a JSON file written by save_wts_json
    pub fn open_wts_json<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let f = File::open(path)?;
        self.read_wts_json(io::BufReader::new(f))
    }

    /// read network weights from JSON, as written by write_wts_json; the
    /// network structure must already be built to match
    pub fn read_wts_json<R: io::Read>(&mut self, r: R) -> Result<()> {
        let val: Value = serde_json::from_reader(r)?;
        self.wts_from_json(&val)
    }

    /// apply network weights from a JSON value
    pub fn wts_from_json(&mut self, val: &Value) -> Result<()> {
        let net = val
            .as_object()
            .ok_or_else(|| NetError::WtsFormat("top level must be an object".to_string()))?;
        for lays in net.values() {
            let lays = lays
                .as_array()
                .ok_or_else(|| NetError::WtsFormat("network must hold a layer list".to_string()))?;
            for lval in lays {
                let lobj = lval.as_object().ok_or_else(|| {
                    NetError::WtsFormat("layer entry must be an object".to_string())
                })?;
                for (lnm, pvals) in lobj.iter() {
                    let li = self.layer_idx(lnm)?;
                    let parr = pvals.as_array().ok_or_else(|| {
                        NetError::WtsFormat(format!("layer {lnm} must hold a projection list"))
                    })?;
                    for pval in parr {
                        self.prjn_wts_from_json(li, pval)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn prjn_wts_from_json(&mut self, li: usize, pval: &Value) -> Result<()> {
        let pobj = pval
            .as_object()
            .ok_or_else(|| NetError::WtsFormat("projection entry must be an object".to_string()))?;
        let mut g_scale = None;
        let mut send_nm = None;
        let mut rows = None;
        for (k, v) in pobj.iter() {
            if k == "GeScale" {
                g_scale = v.as_f64();
            } else {
                send_nm = Some(k.as_str());
                rows = v.as_object();
            }
        }
        let Some(send_nm) = send_nm else {
            return Err(NetError::WtsFormat(
                "projection entry has no sending layer".to_string(),
            ));
        };
        let rows = rows.ok_or_else(|| {
            NetError::WtsFormat(format!("projection from {send_nm} must hold unit rows"))
        })?;
        let pi = self.layers[li]
            .recv_prjns
            .iter()
            .copied()
            .find(|&pi| self.prjns[pi].send_nm == send_nm)
            .ok_or_else(|| {
                NetError::WtsFormat(format!(
                    "layer {} receives no projection from {send_nm}",
                    self.layers[li].name
                ))
            })?;
        if let Some(g) = g_scale {
            self.prjns[pi].g_scale = g as f32;
        }
        self.prjns[pi].wts_from_json(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerType;
    use crate::pattern::Full;
    use crate::prjn::PrjnType;

    fn small_net(seed: u64) -> Network {
        let mut net = Network::with_seed("WtsTest", seed);
        net.add_layer_2d("In", 1, 3, LayerType::Input);
        net.add_layer_2d("Out", 1, 3, LayerType::Target);
        net.connect_layers("In", "Out", Box::new(Full::new()), PrjnType::Forward)
            .unwrap();
        net.build().unwrap();
        net.init_wts();
        net
    }

    #[test]
    fn json_roundtrip() {
        let src = small_net(11);
        let mut buf = Vec::new();
        src.write_wts_json(&mut buf).unwrap();

        let mut dst = small_net(99);
        dst.read_wts_json(buf.as_slice()).unwrap();

        let spj = &src.prjns[0];
        let dpj = &dst.prjns[0];
        for si in 0..3 {
            for ri in 0..3 {
                let sw = spj.syn_val("Wt", si, ri).unwrap();
                let dw = dpj.syn_val("Wt", si, ri).unwrap();
                assert_eq!(sw, dw);
                // linear weights are re-derived on read
                let dl = dpj.syn_val("LWt", si, ri).unwrap();
                let exp = dpj.learn.wt_sig.lin_from_sig_wt(sw);
                assert!((dl - exp).abs() < 1e-6);
            }
        }
        assert_eq!(spj.g_scale, dpj.g_scale);
    }

    #[test]
    fn file_roundtrip() {
        let src = small_net(23);
        let path = std::env::temp_dir().join(format!("leabra_wts_{}.json", std::process::id()));
        src.save_wts_json(&path).unwrap();

        let mut dst = small_net(24);
        dst.open_wts_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        for si in 0..3 {
            for ri in 0..3 {
                assert_eq!(
                    src.prjns[0].syn_val("Wt", si, ri).unwrap(),
                    dst.prjns[0].syn_val("Wt", si, ri).unwrap()
                );
            }
        }
    }

    #[test]
    fn format_has_scale_and_rows() {
        let net = small_net(5);
        let val = net.wts_to_json();
        let lays = val.get("WtsTest").and_then(Value::as_array).unwrap();
        // Out is the second layer and receives the only projection
        let out = lays[1].get("Out").and_then(Value::as_array).unwrap();
        let pj = out[0].as_object().unwrap();
        assert!(pj.contains_key("GeScale"));
        let rows = pj.get("In").and_then(Value::as_object).unwrap();
        let row0 = rows.get("0").unwrap();
        assert_eq!(row0.get("n").unwrap().as_i64().unwrap(), 3);
        assert_eq!(row0.get("Si").unwrap().as_array().unwrap().len(), 3);
    }

    #[test]
    fn unknown_layer_and_prjn_errors() {
        let mut net = small_net(5);
        let bad = serde_json::json!({ "WtsTest": [ { "Nope": [] } ] });
        assert!(matches!(
            net.wts_from_json(&bad),
            Err(NetError::UnknownLayer(_))
        ));
        let bad = serde_json::json!({ "WtsTest": [ { "Out": [ { "GeScale": 1.0, "Hid": {} } ] } ] });
        assert!(matches!(
            net.wts_from_json(&bad),
            Err(NetError::WtsFormat(_))
        ));
    }
}
